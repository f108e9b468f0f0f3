//! Translation of SQLite constraint failures into field-level validation errors.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use sqlx::error::ErrorKind;

use crate::errors::{FitnessError, ValidationErrors};

static CONSTRAINT_COLUMNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:UNIQUE|NOT NULL) constraint failed: (?P<columns>.+)$")
        .expect("constraint pattern is valid")
});

pub(crate) fn translate(e: sqlx::Error) -> FitnessError {
    let sqlx::Error::Database(db_err) = &e else {
        return FitnessError::Database(e);
    };
    let message = db_err.message().to_string();
    debug!("Storage rejected write: {}", message);

    match db_err.kind() {
        ErrorKind::UniqueViolation => match failed_columns(&message) {
            Some((table, fields)) => unique_violation(&table, &fields),
            None => FitnessError::Integrity(message),
        },
        ErrorKind::NotNullViolation => match failed_columns(&message) {
            Some((_, fields)) => {
                let mut errors = ValidationErrors::default();
                for field in &fields {
                    errors.add(field, "This field is required.");
                }
                FitnessError::Validation(errors)
            }
            None => FitnessError::Integrity(message),
        },
        ErrorKind::ForeignKeyViolation | ErrorKind::CheckViolation => {
            FitnessError::Integrity(message)
        }
        _ => FitnessError::Database(e),
    }
}

/// `"user_weights.user_id, user_weights.date"` becomes
/// `("user_weights", ["user", "date"])`.
fn failed_columns(message: &str) -> Option<(String, Vec<String>)> {
    let columns = CONSTRAINT_COLUMNS.captures(message)?.name("columns")?.as_str();
    let mut table = None;
    let mut fields = Vec::new();
    for qualified in columns.split(',') {
        let (t, column) = qualified.trim().split_once('.')?;
        table.get_or_insert_with(|| t.to_string());
        fields.push(column.strip_suffix("_id").unwrap_or(column).to_string());
    }
    Some((table?, fields))
}

fn unique_violation(table: &str, fields: &[String]) -> FitnessError {
    let labels: Vec<String> = fields.iter().map(|f| field_label(f)).collect();
    let joined = match labels.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    };
    let message = format!("{} with this {} already exists.", verbose_name(table), joined);

    let mut errors = ValidationErrors::default();
    for field in fields {
        errors.add(field, message.clone());
    }
    FitnessError::Validation(errors)
}

fn verbose_name(table: &str) -> &str {
    match table {
        "users" => "User",
        "user_profiles" => "User profile",
        "user_weights" => "User weight",
        "foods" => "Food",
        "food_eaten" => "Food eaten",
        "muscles" => "Muscle",
        "exercises" => "Exercise",
        "exercise_muscle_groups" => "Exercise muscle group",
        "exercise_performed" => "Exercise performed",
        other => other,
    }
}

/// `saturated_fat` becomes `Saturated fat`.
pub(crate) fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
