//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse `HOTKEYS_*` environment variables.
//! - Apply environment variable values to a ConfigLoader instance.
//! - Provide helper functions for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Loading key-map documents (see document.rs).
//! - Building the final config (see builder.rs).
//! - .env file loading (handled by ConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Environment variables take precedence over key-map document options.
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid values return ConfigError::InvalidValue.

use std::path::PathBuf;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;
use crate::types::normalize_tags;

pub const ENV_SEQUENCE_TIMEOUT_MS: &str = "HOTKEYS_SEQUENCE_TIMEOUT_MS";
pub const ENV_STOP_PROPAGATION: &str = "HOTKEYS_STOP_PROPAGATION";
pub const ENV_IGNORE_REPEATS: &str = "HOTKEYS_IGNORE_REPEATS";
pub const ENV_IGNORED_TAGS: &str = "HOTKEYS_IGNORED_TAGS";
pub const ENV_IGNORE_CONTENT_EDITABLE: &str = "HOTKEYS_IGNORE_CONTENT_EDITABLE";
pub const ENV_KEYMAP_PATH: &str = "HOTKEYS_KEYMAP_PATH";

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        message: "must be true or false".to_string(),
    })
}

/// Parse a comma-separated tag list. `none` yields an empty list.
fn parse_tags(value: &str) -> Vec<String> {
    if value.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    normalize_tags(value.split(','))
}

/// Apply environment variable configuration to the loader.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if let Some(timeout) = env_var_or_none(ENV_SEQUENCE_TIMEOUT_MS) {
        let millis: u64 = timeout.parse().map_err(|_| ConfigError::InvalidValue {
            var: ENV_SEQUENCE_TIMEOUT_MS.to_string(),
            message: "must be a number of milliseconds".to_string(),
        })?;
        loader.set_sequence_timeout(Some(Duration::from_millis(millis)));
    }
    if let Some(stop) = env_var_or_none(ENV_STOP_PROPAGATION) {
        loader.set_stop_propagation(Some(parse_bool(ENV_STOP_PROPAGATION, &stop)?));
    }
    if let Some(ignore) = env_var_or_none(ENV_IGNORE_REPEATS) {
        loader.set_ignore_repeats(Some(parse_bool(ENV_IGNORE_REPEATS, &ignore)?));
    }
    if let Some(tags) = env_var_or_none(ENV_IGNORED_TAGS) {
        loader.set_ignored_tags(Some(parse_tags(&tags)));
    }
    if let Some(editable) = env_var_or_none(ENV_IGNORE_CONTENT_EDITABLE) {
        loader.set_ignore_content_editable(Some(parse_bool(
            ENV_IGNORE_CONTENT_EDITABLE,
            &editable,
        )?));
    }
    if let Some(path) = env_var_or_none(ENV_KEYMAP_PATH) {
        loader.set_keymap_path(Some(PathBuf::from(path)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_var_or_none_trims() {
        temp_env::with_vars(
            [
                ("HOTKEYS_TEST_PADDED", Some("  value  ")),
                ("HOTKEYS_TEST_BLANK", Some("   ")),
            ],
            || {
                assert_eq!(
                    env_var_or_none("HOTKEYS_TEST_PADDED"),
                    Some("value".to_string())
                );
                assert_eq!(env_var_or_none("HOTKEYS_TEST_BLANK"), None);
                assert_eq!(env_var_or_none("HOTKEYS_TEST_MISSING"), None);
            },
        );
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("Input, textarea,,select"),
            vec!["input", "textarea", "select"]
        );
        assert!(parse_tags("none").is_empty());
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(matches!(
            parse_bool("X", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
