//! Key-map configuration for the hotkeys workspace.
//!
//! This crate provides the static key alias tables, the key combination
//! parser, manager options, and a loader that resolves options and key-map
//! documents from environment variables and files.

pub mod combination;
pub mod constants;
pub mod keys;
mod loader;
pub mod types;

pub use combination::{ChordStep, Combination, KeySpec, ParseError, TriggerOn, parse_combination};
pub use keys::KeyName;
pub use loader::{
    ConfigError, ConfigLoader, ENV_IGNORE_CONTENT_EDITABLE, ENV_IGNORE_REPEATS, ENV_IGNORED_TAGS,
    ENV_KEYMAP_PATH, ENV_SEQUENCE_TIMEOUT_MS, ENV_STOP_PROPAGATION, default_keymap_path,
    env_var_or_none, read_document,
};
pub use types::{
    BindingConflict, DocumentError, HotkeysConfig, HotkeysOptions, KeyMapDocument, OptionsSection,
    ParsedBinding, ScopeDefinition,
};
