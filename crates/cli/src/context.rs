//! Configuration resolution for CLI commands.
//!
//! Responsibilities:
//! - Merge CLI flags, environment variables and the key-map document into a
//!   `HotkeysConfig`.
//! - Require a key-map document for commands that need one.
//!
//! Does NOT handle:
//! - `.env` loading (done in `main()` before argument parsing).
//!
//! Invariants:
//! - CLI flags override environment variables, which override document options.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use hotkeys_config::{ConfigLoader, HotkeysConfig, HotkeysOptions, KeyMapDocument};

use crate::error::CliError;

/// Build the configuration for a command.
///
/// `keymap` is the explicit document path from the command line (or its env
/// fallback via clap); without one the platform default location is tried.
pub fn load_config(keymap: Option<&Path>, sequence_timeout_ms: Option<u64>) -> Result<HotkeysConfig> {
    let mut loader = ConfigLoader::new().from_env()?;

    if let Some(path) = keymap
        && !path.as_os_str().is_empty()
    {
        loader = loader.with_keymap_path(path.to_path_buf());
    }
    if let Some(millis) = sequence_timeout_ms {
        loader = loader.with_sequence_timeout(Duration::from_millis(millis));
    }

    let config = loader.from_keymap_file()?.build()?;
    Ok(config)
}

/// Split a configuration into its options and the document it must carry.
pub fn require_document(config: HotkeysConfig) -> Result<(HotkeysOptions, KeyMapDocument)> {
    match config.document {
        Some(document) => Ok((config.options, document)),
        None => Err(CliError::MissingKeymap.into()),
    }
}
