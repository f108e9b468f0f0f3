pub mod choices;
pub(crate) mod constraints;
pub mod models;
pub mod operations;

use std::str::FromStr;
use std::time::Duration;

use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::errors::{FitnessError, Result};

/// Open a pool for `database_url` and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let in_memory = is_memory_url(database_url);
    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| FitnessError::Config(format!("invalid database url {database_url}: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    // Every connection to `:memory:` gets its own database.
    let max_connections = if in_memory { 1 } else { 5 };
    debug!(
        "Connecting to {} with {} connection(s)",
        database_url, max_connections
    );
    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        // Closing the only connection drops the database with it.
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }
    let pool = pool_options.connect_with(options).await?;

    init_database(&pool).await?;
    Ok(pool)
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

pub async fn clear_all_tables(pool: &SqlitePool) -> Result<()> {
    for table in [
        "exercise_performed",
        "exercise_muscle_groups",
        "exercises",
        "muscles",
        "food_eaten",
        "foods",
        "user_weights",
        "user_profiles",
        "users",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(pool)
            .await?;
    }
    Ok(())
}

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2026_10_19_120000_0000_CREATE_FITNESS_TABLES: &str = include_str!(
    "../../../migrations/2026-10-19-120000-0000_create_fitness_tables/up.sql"
);

const MIGRATIONS: &[Migration] = &[Migration {
    name: "2026-10-19-120000-0000_create_fitness_tables",
    up_sql: MIGRATION_2026_10_19_120000_0000_CREATE_FITNESS_TABLES,
}];

async fn init_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool> {
    let result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(result > 0)
}

pub async fn applied_migrations(pool: &SqlitePool) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>("SELECT name FROM _migrations ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(names)
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Apply every pending migration. Each migration runs in its own transaction.
pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        let mut tx = pool.begin().await?;
        for statement in parse_sql_statements(migration.up_sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    FitnessError::Integrity(format!(
                        "failed to execute migration statement in {}: {} - {}",
                        migration.name, statement, e
                    ))
                })?;
        }
        sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}
