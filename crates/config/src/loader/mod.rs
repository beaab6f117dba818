//! Configuration loader for environment variables and key-map documents.
//!
//! Responsibilities:
//! - Load configuration from `.env` files, environment variables, and key-map documents.
//! - Provide a builder-pattern `ConfigLoader` for hierarchical configuration merging.
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Does NOT handle:
//! - Writing key-map documents back to disk.
//! - Registering scopes from a document (see the CLI and core crates).
//!
//! Invariants / Assumptions:
//! - Precedence is builder > environment > key-map document options > defaults.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

mod builder;
mod document;
mod env;
mod error;

pub use builder::ConfigLoader;
pub use document::{default_keymap_path, read_document};
pub use env::{
    ENV_IGNORE_CONTENT_EDITABLE, ENV_IGNORE_REPEATS, ENV_IGNORED_TAGS, ENV_KEYMAP_PATH,
    ENV_SEQUENCE_TIMEOUT_MS, ENV_STOP_PROPAGATION, env_var_or_none,
};
pub use error::ConfigError;

#[cfg(test)]
mod tests;
