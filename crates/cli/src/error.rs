//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map configuration, key-map and replay script errors to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.

use hotkeys_config::{ConfigError, DocumentError, ParseError};
use hotkeys_core::HotkeysError;
use thiserror::Error;

use crate::commands::replay::ScriptError;

/// Structured exit codes for the `hotkeys` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Configuration error - bad environment value, unreadable or missing key map.
    ///
    /// Scripts should fix the environment or the key-map path.
    ConfigError = 2,

    /// Validation error - malformed key-map entry, scope tree or replay script.
    ///
    /// Scripts should fix the input and not retry.
    ValidationError = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

/// Errors raised by the CLI itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No key-map document found. Pass --keymap or set HOTKEYS_KEYMAP_PATH")]
    MissingKeymap,

    #[error("Invalid output format: {0}. Valid options: text, json")]
    InvalidOutputFormat(String),
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::ConfigFileParse { .. } | ConfigError::InvalidDocument { .. } => {
                ExitCode::ValidationError
            }
            _ => ExitCode::ConfigError,
        }
    }
}

impl From<&CliError> for ExitCode {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::MissingKeymap => ExitCode::ConfigError,
            CliError::InvalidOutputFormat(_) => ExitCode::ValidationError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if no known error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(err);
            }
            if let Some(err) = cause.downcast_ref::<CliError>() {
                return ExitCode::from(err);
            }
            if cause.is::<HotkeysError>()
                || cause.is::<DocumentError>()
                || cause.is::<ParseError>()
                || cause.is::<ScriptError>()
            {
                return ExitCode::ValidationError;
            }
        }

        ExitCode::GeneralError
    }
}
