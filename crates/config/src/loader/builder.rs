//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for hierarchical configuration merging.
//! - Support loading from environment variables, key-map documents, and direct builder methods.
//! - Build and validate the final `HotkeysConfig`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Key-map document loading logic (delegated to document.rs).
//!
//! Invariants / Assumptions:
//! - Environment variables take precedence over key-map document options.
//! - Builder methods take precedence over environment variables when called after `from_env()`.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use std::path::PathBuf;
use std::time::Duration;

use super::document::apply_document;
use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{MAX_SEQUENCE_TIMEOUT_MS, MIN_SEQUENCE_TIMEOUT_MS};
use crate::types::{HotkeysConfig, HotkeysOptions, KeyMapDocument, normalize_tags};

/// Configuration loader that builds config from environment variables and key-map documents.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sequence_timeout: Option<Duration>,
    ignored_tags: Option<Vec<String>>,
    ignore_content_editable: Option<bool>,
    stop_propagation: Option<bool>,
    ignore_repeats: Option<bool>,
    keymap_path: Option<PathBuf>,
    document: Option<KeyMapDocument>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Read the key-map document and fill any options not already set.
    ///
    /// Uses the path from `with_keymap_path`, `HOTKEYS_KEYMAP_PATH`, or the
    /// platform default, in that order.
    pub fn from_keymap_file(mut self) -> Result<Self, ConfigError> {
        apply_document(&mut self)?;
        Ok(self)
    }

    /// Override the key-map document path.
    pub fn with_keymap_path(mut self, path: PathBuf) -> Self {
        self.keymap_path = Some(path);
        self
    }

    /// Set the sequence timeout.
    pub fn with_sequence_timeout(mut self, timeout: Duration) -> Self {
        self.sequence_timeout = Some(timeout);
        self
    }

    /// Set the event target tags whose events are ignored.
    pub fn with_ignored_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_tags = Some(normalize_tags(tags));
        self
    }

    /// Set whether content-editable targets are ignored.
    pub fn with_ignore_content_editable(mut self, ignore: bool) -> Self {
        self.ignore_content_editable = Some(ignore);
        self
    }

    /// Set whether handled events stop propagating.
    pub fn with_stop_propagation(mut self, stop: bool) -> Self {
        self.stop_propagation = Some(stop);
        self
    }

    /// Set whether repeated key-downs of a held key are ignored.
    pub fn with_ignore_repeats(mut self, ignore: bool) -> Self {
        self.ignore_repeats = Some(ignore);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<HotkeysConfig, ConfigError> {
        let defaults = HotkeysOptions::default();
        let options = HotkeysOptions {
            sequence_timeout: self.sequence_timeout.unwrap_or(defaults.sequence_timeout),
            ignored_tags: self.ignored_tags.unwrap_or(defaults.ignored_tags),
            ignore_content_editable: self
                .ignore_content_editable
                .unwrap_or(defaults.ignore_content_editable),
            stop_event_propagation_after_handling: self
                .stop_propagation
                .unwrap_or(defaults.stop_event_propagation_after_handling),
            ignore_repeated_events_when_key_held_down: self
                .ignore_repeats
                .unwrap_or(defaults.ignore_repeated_events_when_key_held_down),
        };

        Self::validate_sequence_timeout(options.sequence_timeout)?;

        Ok(HotkeysConfig {
            options,
            document: self.document,
            keymap_path: self.keymap_path,
        })
    }

    /// Checks the sequence timeout lies within
    /// `MIN_SEQUENCE_TIMEOUT_MS..=MAX_SEQUENCE_TIMEOUT_MS`.
    fn validate_sequence_timeout(timeout: Duration) -> Result<(), ConfigError> {
        let millis = timeout.as_millis();

        if millis < u128::from(MIN_SEQUENCE_TIMEOUT_MS) {
            return Err(ConfigError::InvalidTimeout {
                message: format!(
                    "sequence timeout must be at least {} ms (got {} ms)",
                    MIN_SEQUENCE_TIMEOUT_MS, millis
                ),
            });
        }

        if millis > u128::from(MAX_SEQUENCE_TIMEOUT_MS) {
            return Err(ConfigError::InvalidTimeout {
                message: format!(
                    "sequence timeout exceeds maximum allowed value of {} ms (got {} ms)",
                    MAX_SEQUENCE_TIMEOUT_MS, millis
                ),
            });
        }

        Ok(())
    }

    pub(crate) fn keymap_path(&self) -> Option<&PathBuf> {
        self.keymap_path.as_ref()
    }

    pub(crate) fn sequence_timeout(&self) -> Option<Duration> {
        self.sequence_timeout
    }

    pub(crate) fn ignored_tags(&self) -> Option<&Vec<String>> {
        self.ignored_tags.as_ref()
    }

    pub(crate) fn ignore_content_editable(&self) -> Option<bool> {
        self.ignore_content_editable
    }

    pub(crate) fn stop_propagation(&self) -> Option<bool> {
        self.stop_propagation
    }

    pub(crate) fn ignore_repeats(&self) -> Option<bool> {
        self.ignore_repeats
    }

    pub(crate) fn set_sequence_timeout(&mut self, timeout: Option<Duration>) {
        self.sequence_timeout = timeout;
    }

    pub(crate) fn set_ignored_tags(&mut self, tags: Option<Vec<String>>) {
        self.ignored_tags = tags;
    }

    pub(crate) fn set_ignore_content_editable(&mut self, ignore: Option<bool>) {
        self.ignore_content_editable = ignore;
    }

    pub(crate) fn set_stop_propagation(&mut self, stop: Option<bool>) {
        self.stop_propagation = stop;
    }

    pub(crate) fn set_ignore_repeats(&mut self, ignore: Option<bool>) {
        self.ignore_repeats = ignore;
    }

    pub(crate) fn set_keymap_path(&mut self, path: Option<PathBuf>) {
        self.keymap_path = path;
    }

    pub(crate) fn set_document(&mut self, document: Option<KeyMapDocument>) {
        self.document = document;
    }
}
