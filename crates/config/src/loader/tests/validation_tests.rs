//! Validation tests for the configuration loader builder.
//!
//! Responsibilities:
//! - Test sequence timeout bounds (minimum, maximum, boundaries).

use std::time::Duration;

use crate::constants::{MAX_SEQUENCE_TIMEOUT_MS, MIN_SEQUENCE_TIMEOUT_MS};
use crate::loader::builder::ConfigLoader;
use crate::loader::error::ConfigError;

fn build_with_timeout(millis: u64) -> Result<crate::types::HotkeysConfig, ConfigError> {
    ConfigLoader::new()
        .with_sequence_timeout(Duration::from_millis(millis))
        .build()
}

#[test]
fn test_timeout_below_minimum_invalid() {
    match build_with_timeout(MIN_SEQUENCE_TIMEOUT_MS - 1) {
        Err(ConfigError::InvalidTimeout { message }) => {
            assert!(
                message.contains("at least"),
                "Expected message about the minimum, got: {message}"
            );
        }
        other => panic!("Expected InvalidTimeout, got {other:?}"),
    }
}

#[test]
fn test_timeout_zero_invalid() {
    assert!(matches!(
        build_with_timeout(0),
        Err(ConfigError::InvalidTimeout { .. })
    ));
}

#[test]
fn test_timeout_exceeds_max_invalid() {
    match build_with_timeout(MAX_SEQUENCE_TIMEOUT_MS + 1) {
        Err(ConfigError::InvalidTimeout { message }) => {
            assert!(
                message.contains("exceeds maximum"),
                "Expected message about exceeding max, got: {message}"
            );
        }
        other => panic!("Expected InvalidTimeout, got {other:?}"),
    }
}

#[test]
fn test_timeout_boundaries_valid() {
    assert!(build_with_timeout(MIN_SEQUENCE_TIMEOUT_MS).is_ok());
    assert!(build_with_timeout(MAX_SEQUENCE_TIMEOUT_MS).is_ok());
}

#[test]
fn test_builder_setters() {
    let config = ConfigLoader::new()
        .with_ignored_tags(["Select"])
        .with_ignore_content_editable(false)
        .with_stop_propagation(false)
        .with_ignore_repeats(false)
        .build()
        .unwrap();

    assert_eq!(config.options.ignored_tags, vec!["select"]);
    assert!(!config.options.ignore_content_editable);
    assert!(!config.options.stop_event_propagation_after_handling);
    assert!(!config.options.ignore_repeated_events_when_key_held_down);
}
