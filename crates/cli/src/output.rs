//! Output format selection and writing.
//!
//! Responsibilities:
//! - Parse the `--output` flag.
//! - Send rendered command output to stdout or, atomically, to `--output-file`.
//!
//! Does NOT handle:
//! - Rendering of command results (each command renders its own report).

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::error::CliError;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parse from string.
    pub fn from_str(s: &str) -> Result<Self, CliError> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(CliError::InvalidOutputFormat(s.to_string())),
        }
    }
}

/// Print `content` to stdout, or write it to `output_file` if one was given.
pub fn emit(content: &str, output_file: Option<&Path>, format: OutputFormat) -> Result<()> {
    match output_file {
        Some(path) => {
            write_to_file(content, path)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            eprintln!("Results written to {} ({:?} format)", path.display(), format);
        }
        None => print!("{content}"),
    }
    Ok(())
}

/// Write through a temp file in the target directory, then rename into place.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    let parent_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("Failed to create directory: {}", parent_dir.display()))?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .with_context(|| format!("Failed to create temp file in: {}", parent_dir.display()))?;
    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temp file")?;
    temp_file.flush().context("Failed to flush temp file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}
