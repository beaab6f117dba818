//! Error types for scope registration and dispatch.
//!
//! Responsibilities:
//! - Define `HotkeysError`, returned by registry and manager operations.
//!
//! Does NOT handle:
//! - "No match" outcomes, which are ordinary dispatch results rather than errors.

use hotkeys_config::{DocumentError, ParseError};
use thiserror::Error;

/// Errors from registering, updating or focusing scopes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HotkeysError {
    /// A key-map entry could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A key-map document failed validation.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A scope with this id is already registered.
    #[error("Scope '{id}' is already registered")]
    DuplicateScope { id: String },

    /// No scope with this id is registered.
    #[error("Unknown scope: '{id}'")]
    UnknownScope { id: String },
}

pub type Result<T> = std::result::Result<T, HotkeysError>;
