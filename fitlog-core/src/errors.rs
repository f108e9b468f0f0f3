use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error as ThisError;

use crate::db::constraints;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub type Result<T> = std::result::Result<T, FitnessError>;

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum FitnessError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("{entity} with id {id} does not exist")]
    NotFound { entity: &'static str, id: i64 },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("integrity error: {0}")]
    Integrity(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl FitnessError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        FitnessError::NotFound { entity, id }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::default();
        errors.add(field, message);
        FitnessError::Validation(errors)
    }

    /// Per-field messages when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            FitnessError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for FitnessError {
    fn from(e: sqlx::Error) -> Self {
        constraints::translate(e)
    }
}

impl From<ValidationErrors> for FitnessError {
    fn from(errors: ValidationErrors) -> Self {
        FitnessError::Validation(errors)
    }
}

/// Field name to messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FitnessError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                first = false;
                write!(f, "{}: {}", field, message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_message() {
        let mut errors = ValidationErrors::default();
        errors.add("weight", "This field is required.");
        errors.add("date", "Enter a valid date.");
        errors.add("date", "This field is required.");
        assert_eq!(
            errors.to_string(),
            "date: Enter a valid date.; date: This field is required.; weight: This field is required."
        );
    }

    #[test]
    fn empty_errors_are_ok() {
        assert!(ValidationErrors::default().into_result().is_ok());

        let mut errors = ValidationErrors::default();
        errors.add(NON_FIELD_ERRORS, "broken");
        let err = errors.into_result().unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().get(NON_FIELD_ERRORS),
            ["broken".to_string()]
        );
    }
}
