//! Environment-driven settings shared by the binaries.

use std::env;

use log::LevelFilter;

use crate::errors::{FitnessError, Result};
use crate::logging::parse_level;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const LOG_LEVEL_VAR: &str = "FITLOG_LOG";
pub const ADMIN_USER_VAR: &str = "FITLOG_ADMIN_USER";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub log_level: LevelFilter,
    /// Account the admin surface acts as.
    pub admin_user: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Explicit values win; anything left `None` is read from the environment.
    pub fn with_overrides(
        database_url: Option<String>,
        log_level: Option<String>,
        admin_user: Option<String>,
    ) -> Result<Self> {
        Self::from_lookup(|key| {
            let explicit = match key {
                DATABASE_URL_VAR => database_url.clone(),
                LOG_LEVEL_VAR => log_level.clone(),
                ADMIN_USER_VAR => admin_user.clone(),
                _ => None,
            };
            explicit.or_else(|| env::var(key).ok())
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                FitnessError::Config(format!(
                    "{DATABASE_URL_VAR} must be specified or present in the environment"
                ))
            })?;

        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(raw) => parse_level(&raw).ok_or_else(|| {
                FitnessError::Config(format!("{LOG_LEVEL_VAR} has unknown level {raw:?}"))
            })?,
            None => LevelFilter::Warn,
        };

        Ok(Self {
            database_url,
            log_level,
            admin_user: lookup(ADMIN_USER_VAR).filter(|u| !u.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, FitnessError::Config(_)));
    }

    #[test]
    fn defaults_to_warn_without_admin_user() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:")])).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.admin_user, None);
    }

    #[test]
    fn overrides_take_precedence() {
        let config = Config::with_overrides(
            Some("sqlite::memory:".to_string()),
            Some("info".to_string()),
            Some("coach".to_string()),
        )
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.admin_user.as_deref(), Some("coach"));
    }

    #[test]
    fn reads_level_and_admin_user() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://fitlog.db"),
            ("FITLOG_LOG", "debug"),
            ("FITLOG_ADMIN_USER", "coach"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.admin_user.as_deref(), Some("coach"));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://fitlog.db"),
            ("FITLOG_LOG", "loud"),
        ]))
        .unwrap_err();
        assert!(matches!(err, FitnessError::Config(_)));
    }
}
