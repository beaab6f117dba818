//! Centralized constants for the hotkeys workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Sequence Matching Defaults
// =============================================================================

/// Default idle window between two steps of a key sequence, in milliseconds.
pub const DEFAULT_SEQUENCE_TIMEOUT_MS: u64 = 1000;

/// Smallest accepted sequence timeout in milliseconds.
pub const MIN_SEQUENCE_TIMEOUT_MS: u64 = 50;

/// Largest accepted sequence timeout in milliseconds (10 seconds).
pub const MAX_SEQUENCE_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// Event Filtering Defaults
// =============================================================================

/// Element tags whose key events are ignored by default (text entry targets).
pub const DEFAULT_IGNORED_TAGS: &[&str] = &["input", "select", "textarea"];

/// Whether handled events stop propagating by default.
pub const DEFAULT_STOP_PROPAGATION: bool = true;

/// Whether auto-repeated key-downs of a held key are ignored by default.
pub const DEFAULT_IGNORE_REPEATS: bool = true;

// =============================================================================
// Key-map Document Defaults
// =============================================================================

/// File name of the key-map document inside the platform config directory.
pub const DEFAULT_KEYMAP_FILE_NAME: &str = "keymap.json";

/// Application name used to resolve platform directories.
pub const APP_DIR_NAME: &str = "hotkeys";
