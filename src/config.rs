//! Runtime configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured outside of tests.

use crate::errors::{ServiceError, ServiceResult};
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://training.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_EVENT_CODE_PREFIX: &str = "EVT/";
pub const DEFAULT_EVENT_CODE_PADDING: usize = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings shared by the database layer, the event code sequence and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub event_code_prefix: String,
    pub event_code_padding: usize,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            event_code_prefix: DEFAULT_EVENT_CODE_PREFIX.to_string(),
            event_code_padding: DEFAULT_EVENT_CODE_PADDING,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `TRAINING_*` environment variables, falling back to defaults.
    pub fn from_env() -> ServiceResult<Self> {
        if !cfg!(test) {
            dotenv::dotenv().ok();
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("TRAINING_DATABASE_URL").unwrap_or(defaults.database_url);
        if database_url.trim().is_empty() {
            return Err(ServiceError::Configuration(
                "TRAINING_DATABASE_URL cannot be empty".to_string(),
            ));
        }

        let max_connections = match lookup("TRAINING_DB_MAX_CONNECTIONS") {
            Some(raw) => parse_positive::<u32>("TRAINING_DB_MAX_CONNECTIONS", &raw)?,
            None => defaults.max_connections,
        };

        let event_code_prefix =
            lookup("TRAINING_EVENT_CODE_PREFIX").unwrap_or(defaults.event_code_prefix);

        let event_code_padding = match lookup("TRAINING_EVENT_CODE_PADDING") {
            Some(raw) => parse_positive::<usize>("TRAINING_EVENT_CODE_PADDING", &raw)?,
            None => defaults.event_code_padding,
        };

        let log_level = lookup("TRAINING_LOG_LEVEL")
            .map(|level| level.to_lowercase())
            .unwrap_or(defaults.log_level);
        if log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ServiceError::Configuration(format!(
                "TRAINING_LOG_LEVEL: '{}' is not a valid log level",
                log_level
            )));
        }

        Ok(Self {
            database_url,
            max_connections,
            event_code_prefix,
            event_code_padding,
            log_level,
        })
    }

    /// Settings for an isolated in-memory database.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Self::default()
        }
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> ServiceResult<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ServiceError::Configuration(format!(
            "{}: '{}' must be a positive integer",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.event_code_prefix, "EVT/");
        assert_eq!(settings.event_code_padding, 5);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("TRAINING_DATABASE_URL", "sqlite://other.db"),
            ("TRAINING_DB_MAX_CONNECTIONS", "8"),
            ("TRAINING_EVENT_CODE_PREFIX", "TRN-"),
            ("TRAINING_EVENT_CODE_PADDING", "3"),
            ("TRAINING_LOG_LEVEL", "DEBUG"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url, "sqlite://other.db");
        assert_eq!(settings.max_connections, 8);
        assert_eq!(settings.event_code_prefix, "TRN-");
        assert_eq!(settings.event_code_padding, 3);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        for pairs in [
            vec![("TRAINING_DB_MAX_CONNECTIONS", "zero")],
            vec![("TRAINING_DB_MAX_CONNECTIONS", "0")],
            vec![("TRAINING_EVENT_CODE_PADDING", "-2")],
            vec![("TRAINING_LOG_LEVEL", "loud")],
            vec![("TRAINING_DATABASE_URL", "  ")],
        ] {
            let result = Settings::from_lookup(lookup_from(&pairs));
            assert!(matches!(result, Err(ServiceError::Configuration(_))), "{:?}", pairs);
        }
    }
}
