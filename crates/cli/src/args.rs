//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not merge configuration layers (see `context` module).

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hotkeys")]
#[command(about = "Validate, replay and watch keyboard shortcut key maps", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  hotkeys check keymap.json\n  hotkeys --keymap keymap.yaml replay session.keys\n  hotkeys replay session.keys --focus editor -o json\n  hotkeys watch --focus editor\n"
)]
pub struct Cli {
    /// Path to the key-map document (JSON, or YAML by extension)
    #[arg(short, long, global = true, env = "HOTKEYS_KEYMAP_PATH", value_name = "FILE")]
    pub keymap: Option<PathBuf>,

    /// Sequence timeout in milliseconds (overrides env and document options)
    #[arg(long, global = true, value_name = "MS")]
    pub sequence_timeout_ms: Option<u64>,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9090)
    #[arg(long, global = true, env = "HOTKEYS_METRICS_BIND", value_name = "ADDR")]
    pub metrics_bind: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: String,

    /// Output file path (saves results to file instead of stdout)
    #[arg(long, global = true, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate a key-map document, then list its bindings
    Check {
        /// Document to check (defaults to --keymap)
        file: Option<PathBuf>,
    },

    /// Feed a scripted key event stream through the manager on a virtual clock
    Replay {
        /// Script file, or '-' to read from stdin
        script: PathBuf,

        /// Scope to focus before the first script line
        #[arg(short, long)]
        focus: Option<String>,
    },

    /// Listen to terminal key presses and print dispatched actions until Ctrl+C
    Watch {
        /// Scope to focus while watching
        #[arg(short, long)]
        focus: Option<String>,

        /// Directory for the rolling log file
        #[arg(long, env = "HOTKEYS_LOG_DIR", default_value = "logs", value_name = "DIR")]
        log_dir: PathBuf,

        /// Ask the terminal to report key releases instead of synthesizing them
        #[arg(long)]
        report_releases: bool,
    },
}

impl Commands {
    /// Log directory for commands that own the terminal and so cannot log to stderr.
    pub fn log_dir(&self) -> Option<&Path> {
        match self {
            Commands::Watch { log_dir, .. } => Some(log_dir.as_path()),
            _ => None,
        }
    }
}
