// Library initialization

use crate::config::Settings;
use crate::ffi::error::FFIError;
use crate::ffi::{handle_status_result, parse_payload};
use crate::globals;
use log::error;
use serde::Deserialize;
use std::os::raw::{c_char, c_int};

/// Optional overrides on top of the environment settings
#[derive(Debug, Default, Deserialize)]
struct InitPayload {
    database_url: Option<String>,
    max_connections: Option<u32>,
    event_code_prefix: Option<String>,
    event_code_padding: Option<usize>,
    log_level: Option<String>,
}

impl InitPayload {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(url) = self.database_url {
            settings.database_url = url;
        }
        if let Some(max) = self.max_connections {
            settings.max_connections = max.max(1);
        }
        if let Some(prefix) = self.event_code_prefix {
            settings.event_code_prefix = prefix;
        }
        if let Some(padding) = self.event_code_padding {
            settings.event_code_padding = padding;
        }
        if let Some(level) = self.log_level {
            settings.log_level = level.to_lowercase();
        }
        settings
    }
}

/// Open the database, apply migrations and wire the services.
/// `config_json` may be null to use the environment alone.
///
/// Payload { "database_url"?, "max_connections"?, "event_code_prefix"?,
///           "event_code_padding"?, "log_level"? }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn training_initialize(config_json: *const c_char) -> c_int {
    let result = std::panic::catch_unwind(|| -> Result<(), FFIError> {
        let overrides: InitPayload = if config_json.is_null() {
            InitPayload::default()
        } else {
            unsafe { parse_payload(config_json) }?
        };
        let settings = overrides.apply(Settings::from_env()?);
        crate::init_logging(&settings.log_level);
        globals::block_on(crate::initialize(settings))
    });

    match result {
        Ok(ffi_result) => handle_status_result(|| ffi_result),
        Err(panic_payload) => {
            let panic_msg = if let Some(s) = panic_payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_payload.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Panicked during FFI call, but panic message is not a string".to_string()
            };
            error!("Panic in training_initialize: {}", panic_msg);
            handle_status_result(|| Err(FFIError::internal(format!("Panic during initialization: {}", panic_msg))))
        }
    }
}

/// 1 once `training_initialize` has succeeded, 0 before.
#[unsafe(no_mangle)]
pub extern "C" fn training_is_initialized() -> c_int {
    globals::is_initialized() as c_int
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let payload: InitPayload =
            serde_json::from_str(r#"{"database_url":"sqlite::memory:","event_code_padding":3}"#).unwrap();
        let settings = payload.apply(Settings::default());
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.event_code_padding, 3);
        assert_eq!(settings.event_code_prefix, "EVT/");
    }
}
