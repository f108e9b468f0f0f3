//! Record management over the registered entities.
//!
//! `AdminSite` is the generic list/search/detail/create/edit/delete surface.
//! Each entity plugs in through an `AdminModel` implementation, selected by
//! `Entity` at the call site.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;
use sqlx::SqlitePool;

pub mod forms;
pub mod registry;

mod catalog;
mod logs;
mod users;

use crate::admin::forms::{CleanedData, FieldKind, FieldSpec, FormData, clean, defaults};
use crate::admin::registry::{Entity, InlineAdmin, InlineStyle, ModelAdmin, REGISTRY};
use crate::db::models::User;
use crate::db::operations::{get_user_by_username, record_exists};
use crate::errors::{FitnessError, Result, ValidationErrors};

pub use catalog::{EXERCISE_FIELDS, FOOD_FIELDS, MUSCLE_FIELDS};
pub use logs::{EXERCISE_PERFORMED_FIELDS, FOOD_EATEN_FIELDS, USER_WEIGHT_FIELDS};
pub use users::{PROFILE_FIELDS, USER_FIELDS};

/// Cleaned inline forms keyed by inline name.
pub(crate) type InlineData = BTreeMap<&'static str, CleanedData>;

/// Per-entity storage hooks behind the generic admin views.
pub(crate) trait AdminModel {
    fn fields() -> &'static [FieldSpec];

    /// Changelist rows in the entity's default ordering.
    async fn rows(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<ChangeListRow>>;

    async fn label(pool: &SqlitePool, id: i64) -> Result<String>;

    /// Stored values as form data, inline keys included.
    async fn initial(pool: &SqlitePool, id: i64) -> Result<FormData>;

    async fn create(pool: &SqlitePool, data: &CleanedData) -> Result<i64>;

    async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CleanedData,
        inlines: &InlineData,
    ) -> Result<()>;

    /// Records removed along with this one.
    async fn related(_pool: &SqlitePool, _id: i64) -> Result<Vec<RelatedCount>> {
        Ok(Vec::new())
    }

    async fn delete(pool: &SqlitePool, id: i64) -> Result<u64>;
}

/// Runs `$body` with `$model` bound to the `AdminModel` for `$entity`.
macro_rules! with_model {
    ($entity:expr, $model:ident => $body:expr) => {
        match $entity {
            Entity::User => {
                type $model = users::UserAdmin;
                $body
            }
            Entity::UserWeight => {
                type $model = logs::UserWeightAdmin;
                $body
            }
            Entity::Food => {
                type $model = catalog::FoodAdmin;
                $body
            }
            Entity::FoodEaten => {
                type $model = logs::FoodEatenAdmin;
                $body
            }
            Entity::Exercise => {
                type $model = catalog::ExerciseAdmin;
                $body
            }
            Entity::ExercisePerformed => {
                type $model = logs::ExercisePerformedAdmin;
                $body
            }
            Entity::Muscle => {
                type $model = catalog::MuscleAdmin;
                $body
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedCount {
    pub label: &'static str,
    pub count: i64,
}

pub(crate) async fn count_related(
    pool: &SqlitePool,
    label: &'static str,
    table: &str,
    column: &str,
    id: i64,
) -> Result<RelatedCount> {
    let count: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1"))
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(RelatedCount { label, count })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeListRow {
    pub id: i64,
    pub label: String,
    /// One cell per list column.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeList {
    pub entity: Entity,
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<ChangeListRow>,
    pub search: Option<String>,
    pub total: usize,
}

impl ChangeList {
    /// Cells under the named header.
    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let index = self.headers.iter().position(|h| *h == header)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.cells.get(index).map(String::as_str).unwrap_or_default())
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Widget {
    Input,
    TextArea,
    Checkbox,
    DateInput,
    Select { options: Vec<SelectOption> },
    SelectMultiple { options: Vec<SelectOption> },
    /// Bare id input; only the current target's label is looked up.
    ForeignKeyRawId { label: Option<String> },
    FileInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundField {
    pub name: String,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub help_text: &'static str,
    pub widget: Widget,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineForm {
    pub name: &'static str,
    pub verbose_name_plural: &'static str,
    pub style: InlineStyle,
    pub can_delete: bool,
    pub fields: Vec<BoundField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeForm {
    pub entity: Entity,
    pub object_id: Option<i64>,
    pub title: String,
    pub fields: Vec<BoundField>,
    pub inlines: Vec<InlineForm>,
}

impl ChangeForm {
    pub fn field(&self, name: &str) -> Option<&BoundField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletionSummary {
    pub entity: Entity,
    pub id: i64,
    pub label: String,
    pub related: Vec<RelatedCount>,
}

#[derive(Clone)]
pub struct AdminSite {
    pool: SqlitePool,
}

impl AdminSite {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn registry(&self) -> &'static [ModelAdmin] {
        &REGISTRY
    }

    pub fn model_admin(&self, entity: Entity) -> &'static ModelAdmin {
        entity.admin()
    }

    pub fn has_permission(user: &User) -> bool {
        user.can_use_admin()
    }

    /// Resolve the account acting on the site, refusing non-staff.
    pub async fn actor(&self, username: &str) -> Result<User> {
        let user = get_user_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| FitnessError::PermissionDenied(format!("unknown user {}", username)))?;
        check_permission(&user)?;
        Ok(user)
    }

    pub async fn changelist(
        &self,
        actor: &User,
        entity: Entity,
        search: Option<&str>,
    ) -> Result<ChangeList> {
        check_permission(actor)?;
        let admin = entity.admin();
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let rows = with_model!(entity, M => M::rows(&self.pool, search).await?);
        debug!("Listed {} {}", rows.len(), admin.verbose_name_plural);
        Ok(ChangeList {
            entity,
            title: format!("Select {} to change", admin.verbose_name),
            headers: admin.headers(),
            total: rows.len(),
            rows,
            search: search.map(str::to_string),
        })
    }

    /// Form for `object_id`, or the add form when `None`.
    pub async fn change_form(
        &self,
        actor: &User,
        entity: Entity,
        object_id: Option<i64>,
    ) -> Result<ChangeForm> {
        check_permission(actor)?;
        let admin = entity.admin();
        let fields = with_model!(entity, M => M::fields());
        let values = match object_id {
            Some(id) => with_model!(entity, M => M::initial(&self.pool, id).await?),
            None => defaults(fields, None),
        };

        let mut bound = Vec::with_capacity(fields.len());
        for field in fields {
            bound.push(self.bind_field(admin, field, None, &values).await?);
        }

        let mut inlines = Vec::new();
        for inline in admin.inline_instances(object_id) {
            let mut inline_fields = Vec::with_capacity(inline.fields.len());
            for field in inline.fields {
                inline_fields.push(self.bind_field(admin, field, Some(inline.name), &values).await?);
            }
            inlines.push(InlineForm {
                name: inline.name,
                verbose_name_plural: inline.verbose_name_plural,
                style: inline.style,
                can_delete: inline.can_delete,
                fields: inline_fields,
            });
        }

        let title = match object_id {
            Some(_) => format!("Change {}", admin.verbose_name),
            None => format!("Add {}", admin.verbose_name),
        };
        Ok(ChangeForm {
            entity,
            object_id,
            title,
            fields: bound,
            inlines,
        })
    }

    async fn bind_field(
        &self,
        admin: &ModelAdmin,
        field: &FieldSpec,
        prefix: Option<&str>,
        values: &FormData,
    ) -> Result<BoundField> {
        let name = field.key(prefix);
        let value = values.get(&name).cloned().unwrap_or_default();
        let widget = match field.kind {
            FieldKind::Char { .. } | FieldKind::Username | FieldKind::Email => Widget::Input,
            FieldKind::Float | FieldKind::Integer | FieldKind::PositiveInteger => Widget::Input,
            FieldKind::Text => Widget::TextArea,
            FieldKind::Date => Widget::DateInput,
            FieldKind::Boolean => Widget::Checkbox,
            FieldKind::Image => Widget::FileInput,
            FieldKind::Choice(choices) => Widget::Select {
                options: choices()
                    .into_iter()
                    .map(|(value, label)| SelectOption {
                        value: value.to_string(),
                        label: label.to_string(),
                    })
                    .collect(),
            },
            FieldKind::ForeignKey(target) if prefix.is_none() && admin.is_raw_id_field(field.name) => {
                let label = match value.parse::<i64>() {
                    Ok(id) => match with_model!(target, M => M::label(&self.pool, id).await) {
                        Ok(label) => Some(label),
                        Err(FitnessError::NotFound { .. }) => None,
                        Err(e) => return Err(e),
                    },
                    Err(_) => None,
                };
                Widget::ForeignKeyRawId { label }
            }
            FieldKind::ForeignKey(target) => Widget::Select {
                options: self.options(target).await?,
            },
            FieldKind::ManyToMany(target) => Widget::SelectMultiple {
                options: self.options(target).await?,
            },
        };
        Ok(BoundField {
            name,
            label: field.label,
            value,
            required: field.required,
            help_text: field.help_text,
            widget,
        })
    }

    async fn options(&self, target: Entity) -> Result<Vec<SelectOption>> {
        let rows = with_model!(target, M => M::rows(&self.pool, None).await?);
        Ok(rows
            .into_iter()
            .map(|row| SelectOption {
                value: row.id.to_string(),
                label: row.label,
            })
            .collect())
    }

    /// Validate `form` and create the record. Inlines are not accepted here.
    pub async fn add(&self, actor: &User, entity: Entity, form: &FormData) -> Result<i64> {
        check_permission(actor)?;
        let fields = with_model!(entity, M => M::fields());
        let cleaned = clean(fields, form, None)?;
        self.check_references(fields, &cleaned).await?;
        let id = with_model!(entity, M => M::create(&self.pool, &cleaned).await?);
        info!("{} added {} {}", actor.username, entity, id);
        Ok(id)
    }

    /// Overlay `form` on the stored values, validate, then save.
    pub async fn change(
        &self,
        actor: &User,
        entity: Entity,
        id: i64,
        form: &FormData,
    ) -> Result<i64> {
        check_permission(actor)?;
        let admin = entity.admin();
        let fields = with_model!(entity, M => M::fields());
        let mut merged = with_model!(entity, M => M::initial(&self.pool, id).await?);
        merged.extend(form.iter().map(|(k, v)| (k.clone(), v.clone())));

        let cleaned = clean(fields, &merged, None);
        let mut inline_errors = ValidationErrors::default();
        let mut inlines = InlineData::new();
        for inline in admin.inline_instances(Some(id)) {
            if !submits_inline(inline, form) {
                continue;
            }
            match clean(inline.fields, &merged, Some(inline.name)) {
                Ok(data) => {
                    inlines.insert(inline.name, data);
                }
                Err(e) => inline_errors.merge(e),
            }
        }
        let cleaned = match cleaned {
            Ok(cleaned) => {
                inline_errors.into_result()?;
                cleaned
            }
            Err(mut errors) => {
                errors.merge(inline_errors);
                return Err(errors.into());
            }
        };

        self.check_references(fields, &cleaned).await?;
        with_model!(entity, M => M::update(&self.pool, id, &cleaned, &inlines).await?);
        info!("{} changed {} {}", actor.username, entity, id);
        Ok(id)
    }

    /// What deleting the record would remove, without deleting it.
    pub async fn delete_preview(
        &self,
        actor: &User,
        entity: Entity,
        id: i64,
    ) -> Result<DeletionSummary> {
        check_permission(actor)?;
        let label = with_model!(entity, M => M::label(&self.pool, id).await?);
        let related = with_model!(entity, M => M::related(&self.pool, id).await?);
        Ok(DeletionSummary {
            entity,
            id,
            label,
            related,
        })
    }

    pub async fn delete(&self, actor: &User, entity: Entity, id: i64) -> Result<DeletionSummary> {
        let summary = self.delete_preview(actor, entity, id).await?;
        let deleted = with_model!(entity, M => M::delete(&self.pool, id).await?);
        if deleted == 0 {
            return Err(FitnessError::not_found(entity.admin().verbose_name, id));
        }
        info!(
            "{} deleted {} {} ({})",
            actor.username, entity, id, summary.label
        );
        Ok(summary)
    }

    /// Referenced records must exist before anything is written.
    async fn check_references(&self, fields: &[FieldSpec], cleaned: &CleanedData) -> Result<()> {
        let mut errors = ValidationErrors::default();
        for field in fields {
            let Some(target) = field.target() else {
                continue;
            };
            match field.kind {
                FieldKind::ForeignKey(_) => {
                    let Some(id) = cleaned.reference(field.name) else {
                        continue;
                    };
                    if !record_exists(&self.pool, target.table(), id).await? {
                        errors.add(
                            field.name,
                            "Select a valid choice. That choice is not one of the available choices.",
                        );
                    }
                }
                _ => {
                    for id in cleaned.references(field.name) {
                        if !record_exists(&self.pool, target.table(), id).await? {
                            errors.add(
                                field.name,
                                format!(
                                    "Select a valid choice. {} is not one of the available choices.",
                                    id
                                ),
                            );
                        }
                    }
                }
            }
        }
        errors.into_result()
    }
}

fn check_permission(actor: &User) -> Result<()> {
    if AdminSite::has_permission(actor) {
        Ok(())
    } else {
        Err(FitnessError::PermissionDenied(format!(
            "{} is not an active staff account",
            actor.username
        )))
    }
}

/// An inline is only validated when the submission touches one of its keys.
fn submits_inline(inline: &InlineAdmin, form: &FormData) -> bool {
    let prefix = format!("{}-", inline.name);
    form.keys().any(|k| k.starts_with(&prefix))
}
