//! Key-map document loading.
//!
//! Responsibilities:
//! - Resolve the key-map document path (explicit, env, or platform default).
//! - Read and deserialize JSON or YAML documents, then validate them.
//! - Apply document options to a ConfigLoader instance.
//!
//! Does NOT handle:
//! - Environment variable parsing (see env.rs).
//! - Building the final config (see builder.rs).
//!
//! Invariants:
//! - Document options only fill values not already set by env or builder calls.
//! - A missing file at the default location is not an error; a missing
//!   explicitly configured file is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use super::builder::ConfigLoader;
use super::error::ConfigError;
use crate::constants::{APP_DIR_NAME, DEFAULT_KEYMAP_FILE_NAME};
use crate::types::{KeyMapDocument, normalize_tags};

/// Returns the default path to the key-map document.
///
/// - Linux: `~/.config/hotkeys/keymap.json`
/// - macOS: `~/Library/Application Support/hotkeys/keymap.json`
/// - Windows: `%AppData%\hotkeys\config\keymap.json`
pub fn default_keymap_path() -> Result<PathBuf, anyhow::Error> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_DIR_NAME)
        .context("Failed to determine project directories")?;

    Ok(proj_dirs.config_dir().join(DEFAULT_KEYMAP_FILE_NAME))
}

/// Read, deserialize and validate a key-map document.
///
/// Files ending in `.yaml` or `.yml` are read as YAML, everything else as JSON.
pub fn read_document(path: &Path) -> Result<KeyMapDocument, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let document: KeyMapDocument = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ConfigFileParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::ConfigFileParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    document
        .validate()
        .map_err(|source| ConfigError::InvalidDocument {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(document)
}

/// Load the key-map document into the loader and fill unset options from it.
pub fn apply_document(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    let (path, explicit) = match loader.keymap_path() {
        Some(path) => (path.clone(), true),
        None => (
            default_keymap_path().map_err(|e| ConfigError::ConfigDirUnavailable(e.to_string()))?,
            false,
        ),
    };

    if !explicit && !path.exists() {
        tracing::debug!(path = %path.display(), "No key-map document at default location");
        return Ok(());
    }

    let document = read_document(&path)?;
    tracing::info!(
        path = %path.display(),
        scopes = document.scopes.len(),
        "Loaded key-map document"
    );

    let options = &document.options;
    if loader.sequence_timeout().is_none()
        && let Some(millis) = options.sequence_timeout_ms
    {
        loader.set_sequence_timeout(Some(Duration::from_millis(millis)));
    }
    if loader.ignored_tags().is_none()
        && let Some(tags) = &options.ignored_tags
    {
        loader.set_ignored_tags(Some(normalize_tags(tags)));
    }
    if loader.ignore_content_editable().is_none() {
        loader.set_ignore_content_editable(options.ignore_content_editable);
    }
    if loader.stop_propagation().is_none() {
        loader.set_stop_propagation(options.stop_event_propagation_after_handling);
    }
    if loader.ignore_repeats().is_none() {
        loader.set_ignore_repeats(options.ignore_repeated_events_when_key_held_down);
    }

    loader.set_keymap_path(Some(path));
    loader.set_document(Some(document));
    Ok(())
}
