//! Configuration types for the hotkeys workspace.
//!
//! Responsibilities:
//! - Define manager options (`HotkeysOptions`) and their document form.
//! - Define the key-map document model and its validation.
//! - Define `HotkeysConfig`, the value produced by `ConfigLoader::build`.
//!
//! Does NOT handle:
//! - Loading from environment variables or files (see `loader`).

mod keymap;
mod options;

use std::path::PathBuf;

pub use keymap::{BindingConflict, DocumentError, KeyMapDocument, ParsedBinding, ScopeDefinition};
pub use options::{HotkeysOptions, OptionsSection};
pub(crate) use options::normalize_tags;

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct HotkeysConfig {
    /// Options for the key event manager
    pub options: HotkeysOptions,
    /// The key-map document, if one was loaded
    pub document: Option<KeyMapDocument>,
    /// Where the key-map document was read from
    pub keymap_path: Option<PathBuf>,
}
