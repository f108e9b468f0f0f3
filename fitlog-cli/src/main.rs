use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::debug;

use fitlog::FitnessError;
use fitlog::admin::forms::FormData;
use fitlog::admin::registry::Entity;
use fitlog::admin::{AdminSite, ChangeForm, ChangeList, ChangeListRow, Widget};
use fitlog::config::{ADMIN_USER_VAR, Config, DATABASE_URL_VAR, LOG_LEVEL_VAR};
use fitlog::db::choices::ActivityLevel;
use fitlog::db::models::{NewUser, User};
use fitlog::db::{applied_migrations, connect, operations};
use fitlog::logging::init_logger;

use crossterm::event::{self, KeyCode};
use ratatui::{
    DefaultTerminal,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

#[derive(Parser, Debug)]
#[command(version, about = "fitlog - fitness records admin", long_about = None)]
struct Args {
    #[arg(long, global = true, env = DATABASE_URL_VAR)]
    database_url: Option<String>,
    #[arg(long, global = true, env = LOG_LEVEL_VAR)]
    log_level: Option<String>,
    /// Staff account to act as
    #[arg(long = "as", global = true, env = ADMIN_USER_VAR)]
    as_user: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Create an account and its profile
    CreateUser {
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        staff: bool,
        #[arg(long)]
        superuser: bool,
    },
    /// List registered entities
    Entities,
    /// Changelist for an entity
    List {
        #[arg(value_parser = parse_entity)]
        entity: Entity,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Change form for a record, or the add form without an id
    Show {
        #[arg(value_parser = parse_entity)]
        entity: Entity,
        id: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Create a record from key=value fields
    Add {
        #[arg(value_parser = parse_entity)]
        entity: Entity,
        #[arg(value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },
    /// Change fields of a record
    Edit {
        #[arg(value_parser = parse_entity)]
        entity: Entity,
        id: i64,
        #[arg(value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },
    /// Delete a record and everything that depends on it
    Delete {
        #[arg(value_parser = parse_entity)]
        entity: Entity,
        id: i64,
    },
    /// Activity level multipliers
    ActivityLevels,
    /// Browse and delete records in the terminal
    Interactive,
}

fn parse_entity(raw: &str) -> std::result::Result<Entity, String> {
    raw.parse()
}

fn parse_pair(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))
}

fn form_data(fields: Vec<(String, String)>) -> FormData {
    fields.into_iter().collect()
}

async fn actor(site: &AdminSite, config: &Config) -> Result<User> {
    let username = config.admin_user.as_deref().ok_or_else(|| {
        anyhow!("no admin account given, pass --as or set {}", ADMIN_USER_VAR)
    })?;
    Ok(site.actor(username).await?)
}

fn print_changelist(list: &ChangeList) {
    println!("{} ({} total)", list.title, list.total);
    println!("id\t{}", list.headers.join("\t"));
    for ChangeListRow { id, cells, .. } in &list.rows {
        println!("{}\t{}", id, cells.join("\t"));
    }
}

fn print_change_form(form: &ChangeForm) {
    match form.object_id {
        Some(id) => println!("{} #{}", form.title, id),
        None => println!("{}", form.title),
    }
    let sections = std::iter::once(("", &form.fields))
        .chain(form.inlines.iter().map(|i| (i.verbose_name_plural, &i.fields)));
    for (heading, fields) in sections {
        if !heading.is_empty() {
            println!("\n[{}]", heading);
        }
        for field in fields {
            let marker = if field.required { "*" } else { " " };
            let detail = match &field.widget {
                Widget::ForeignKeyRawId { label: Some(label) } => format!(" ({})", label),
                Widget::Select { options } | Widget::SelectMultiple { options } => {
                    let shown: Vec<String> = options
                        .iter()
                        .map(|o| format!("{}={}", o.value, o.label))
                        .collect();
                    format!("  [{}]", shown.join(", "))
                }
                _ => String::new(),
            };
            println!("{} {} ({}): {}{}", marker, field.label, field.name, field.value, detail);
        }
    }
}

/// Validation failures are listed per field instead of as one line.
fn report(err: FitnessError) -> anyhow::Error {
    if let Some(errors) = err.validation_errors() {
        for field in errors.fields() {
            for message in errors.get(field) {
                eprintln!("{}: {}", field, message);
            }
        }
    }
    err.into()
}

struct EntityBrowser {
    site: AdminSite,
    actor: User,
    entity: Option<Entity>,
    entity_index: usize,
    rows: Vec<ChangeListRow>,
    selected: usize,
    search: String,
    status_message: String,
    input_mode: InputMode,
}

enum InputMode {
    Normal,
    Searching,
}

const ENTITY_HELP: &str = "j/k: navigate | enter: open | q: quit";
const ROW_HELP: &str = "j/k: navigate | /: search | d: delete | esc: back | q: quit";

impl EntityBrowser {
    fn new(site: AdminSite, actor: User) -> Self {
        Self {
            site,
            actor,
            entity: None,
            entity_index: 0,
            rows: Vec::new(),
            selected: 0,
            search: String::new(),
            status_message: ENTITY_HELP.to_string(),
            input_mode: InputMode::Normal,
        }
    }

    fn len(&self) -> usize {
        match self.entity {
            Some(_) => self.rows.len(),
            None => Entity::ALL.len(),
        }
    }

    fn cursor(&mut self) -> &mut usize {
        match self.entity {
            Some(_) => &mut self.selected,
            None => &mut self.entity_index,
        }
    }

    fn scroll_down(&mut self) {
        let len = self.len();
        let cursor = self.cursor();
        if len > 0 && *cursor < len - 1 {
            *cursor += 1;
        }
    }

    fn scroll_up(&mut self) {
        let cursor = self.cursor();
        if *cursor > 0 {
            *cursor -= 1;
        }
    }

    async fn open(&mut self, entity: Entity) -> Result<()> {
        self.entity = Some(entity);
        self.search.clear();
        self.selected = 0;
        self.refresh().await?;
        self.status_message = ROW_HELP.to_string();
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        let Some(entity) = self.entity else {
            return Ok(());
        };
        let search = Some(self.search.as_str()).filter(|s| !s.is_empty());
        let list = self.site.changelist(&self.actor, entity, search).await?;
        self.rows = list.rows;
        if self.selected >= self.rows.len() && !self.rows.is_empty() {
            self.selected = self.rows.len() - 1;
        }
        Ok(())
    }

    async fn apply_search(&mut self) -> Result<()> {
        self.input_mode = InputMode::Normal;
        self.selected = 0;
        self.status_message = ROW_HELP.to_string();
        self.refresh().await
    }

    async fn cancel_search(&mut self) -> Result<()> {
        self.search.clear();
        self.apply_search().await
    }

    fn back(&mut self) {
        self.entity = None;
        self.rows.clear();
        self.status_message = ENTITY_HELP.to_string();
    }

    async fn delete_selected(&mut self) -> Result<()> {
        let Some(entity) = self.entity else {
            return Ok(());
        };
        let Some(row) = self.rows.get(self.selected) else {
            return Ok(());
        };
        let summary = self.site.delete(&self.actor, entity, row.id).await?;
        let cascaded: i64 = summary.related.iter().map(|r| r.count).sum();
        self.status_message = format!(
            "Deleted {} {:?} ({} related record(s))",
            entity, summary.label, cascaded
        );
        self.refresh().await
    }

    fn title(&self) -> String {
        match self.entity {
            Some(entity) if self.search.is_empty() => {
                format!("{} ({} total)", entity.admin().verbose_name_plural, self.rows.len())
            }
            Some(entity) => format!(
                "{} matching {:?} ({} total)",
                entity.admin().verbose_name_plural,
                self.search,
                self.rows.len()
            ),
            None => "Entities".to_string(),
        }
    }

    fn items(&self) -> Vec<String> {
        match self.entity {
            Some(_) => self
                .rows
                .iter()
                .map(|row| format!("#{} {}", row.id, row.cells.join(" | ")))
                .collect(),
            None => Entity::ALL
                .iter()
                .map(|e| e.admin().verbose_name_plural.to_string())
                .collect(),
        }
    }
}

async fn run_entity_browser(mut terminal: DefaultTerminal, site: AdminSite, actor: User) -> Result<()> {
    let mut browser = EntityBrowser::new(site, actor);

    loop {
        terminal.draw(|frame| {
            let chunks = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

            let header = Paragraph::new(format!("fitlog admin - {}", browser.actor.username))
                .style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(header, chunks[0]);

            match browser.input_mode {
                InputMode::Normal => {
                    let cursor = match browser.entity {
                        Some(_) => browser.selected,
                        None => browser.entity_index,
                    };
                    let items: Vec<ListItem> = browser
                        .items()
                        .into_iter()
                        .enumerate()
                        .map(|(idx, content)| {
                            let style = if idx == cursor {
                                Style::default()
                                    .fg(Color::Black)
                                    .bg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD)
                            } else {
                                Style::default()
                            };
                            ListItem::new(content).style(style)
                        })
                        .collect();

                    if items.is_empty() {
                        let empty_msg = Paragraph::new("Nothing here yet.")
                            .style(Style::default().fg(Color::Gray))
                            .block(Block::default().borders(Borders::ALL).title(browser.title()));
                        frame.render_widget(empty_msg, chunks[1]);
                    } else {
                        let list = List::new(items)
                            .block(Block::default().borders(Borders::ALL).title(browser.title()));
                        let mut list_state = ListState::default();
                        list_state.select(Some(cursor));
                        frame.render_stateful_widget(list, chunks[1], &mut list_state);
                    }
                }
                InputMode::Searching => {
                    let input_widget = Paragraph::new(browser.search.as_str())
                        .style(Style::default().fg(Color::Yellow))
                        .block(Block::default().borders(Borders::ALL).title("Search"));
                    frame.render_widget(input_widget, chunks[1]);
                }
            }

            let footer = Paragraph::new(browser.status_message.as_str())
                .style(Style::default().fg(Color::White))
                .block(Block::default().borders(Borders::ALL).title("Status"));
            frame.render_widget(footer, chunks[2]);
        })?;

        if let event::Event::Key(key) = event::read()? {
            match browser.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char('j') | KeyCode::Down => browser.scroll_down(),
                    KeyCode::Char('k') | KeyCode::Up => browser.scroll_up(),
                    KeyCode::Enter if browser.entity.is_none() => {
                        let entity = Entity::ALL[browser.entity_index];
                        if let Err(e) = browser.open(entity).await {
                            browser.status_message = format!("Error: {}", e);
                        }
                    }
                    KeyCode::Esc | KeyCode::Char('h') => browser.back(),
                    KeyCode::Char('/') if browser.entity.is_some() => {
                        browser.input_mode = InputMode::Searching;
                        browser.status_message = "Type to search, enter to apply".to_string();
                    }
                    KeyCode::Char('d') | KeyCode::Char('D') => {
                        if let Err(e) = browser.delete_selected().await {
                            browser.status_message = format!("Error: {}", e);
                        }
                    }
                    _ => {}
                },
                InputMode::Searching => match key.code {
                    KeyCode::Enter => {
                        if let Err(e) = browser.apply_search().await {
                            browser.status_message = format!("Error: {}", e);
                        }
                    }
                    KeyCode::Esc => {
                        if let Err(e) = browser.cancel_search().await {
                            browser.status_message = format!("Error: {}", e);
                        }
                    }
                    KeyCode::Char(c) => browser.search.push(c),
                    KeyCode::Backspace => {
                        browser.search.pop();
                    }
                    _ => {}
                },
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    let config = Config::with_overrides(args.database_url, args.log_level, args.as_user)?;
    init_logger(config.log_level);
    debug!("Using database {}", config.database_url);

    let pool = connect(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;
    let site = AdminSite::new(pool.clone());

    match args.command {
        Commands::Migrate => {
            for name in applied_migrations(&pool).await? {
                println!("applied {}", name);
            }
        }
        Commands::CreateUser {
            username,
            email,
            first_name,
            last_name,
            staff,
            superuser,
        } => {
            let new_user = NewUser {
                email,
                first_name,
                last_name,
                is_staff: staff || superuser,
                is_superuser: superuser,
                ..NewUser::new(username)
            };
            let user = operations::create_user(&pool, &new_user)
                .await
                .map_err(report)?;
            println!("Created user {} ({})", user.username, user.id);
        }
        Commands::Entities => {
            for admin in site.registry() {
                println!("{}\t{}", admin.entity.slug(), admin.verbose_name_plural);
            }
        }
        Commands::List {
            entity,
            search,
            json,
        } => {
            let actor = actor(&site, &config).await?;
            let list = site.changelist(&actor, entity, search.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_changelist(&list);
            }
        }
        Commands::Show { entity, id, json } => {
            let actor = actor(&site, &config).await?;
            let form = site.change_form(&actor, entity, id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&form)?);
            } else {
                print_change_form(&form);
            }
        }
        Commands::Add { entity, fields } => {
            let actor = actor(&site, &config).await?;
            let id = site
                .add(&actor, entity, &form_data(fields))
                .await
                .map_err(report)?;
            println!("Added {} {}", entity, id);
        }
        Commands::Edit { entity, id, fields } => {
            let actor = actor(&site, &config).await?;
            site.change(&actor, entity, id, &form_data(fields))
                .await
                .map_err(report)?;
            println!("Changed {} {}", entity, id);
        }
        Commands::Delete { entity, id } => {
            let actor = actor(&site, &config).await?;
            let summary = site.delete(&actor, entity, id).await?;
            println!("Deleted {} {:?}", entity, summary.label);
            for related in summary.related.iter().filter(|r| r.count > 0) {
                println!("  with {} {}", related.count, related.label);
            }
        }
        Commands::ActivityLevels => {
            for level in ActivityLevel::ALL {
                println!("{:.2}\t{}", level.multiplier(), level.label());
            }
        }
        Commands::Interactive => {
            let actor = actor(&site, &config).await?;
            let terminal = ratatui::init();
            let result = run_entity_browser(terminal, site, actor).await;
            ratatui::restore();
            result?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelling_a_search_lists_every_row_again() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let staff = NewUser {
            is_staff: true,
            ..NewUser::new("ann")
        };
        let actor = operations::create_user(&pool, &staff).await.unwrap();
        operations::create_user(&pool, &NewUser::new("bob")).await.unwrap();

        let mut browser = EntityBrowser::new(AdminSite::new(pool), actor);
        browser.open(Entity::User).await.unwrap();
        assert_eq!(browser.rows.len(), 2);

        browser.input_mode = InputMode::Searching;
        browser.search.push_str("bo");
        browser.apply_search().await.unwrap();
        assert_eq!(browser.rows.len(), 1);

        browser.input_mode = InputMode::Searching;
        browser.cancel_search().await.unwrap();
        assert!(matches!(browser.input_mode, InputMode::Normal));
        assert!(browser.search.is_empty());
        assert_eq!(browser.rows.len(), 2);
    }
}
