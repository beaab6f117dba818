//! hotkeys - Command-line tools for keyboard shortcut key maps.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Install logging and, on request, the Prometheus metrics exporter.
//! - Run the selected command and exit with a structured exit code.
//!
//! Does NOT handle:
//! - Matching or dispatch logic (see `crates/core`).
//! - Key-map parsing and validation (see `crates/config`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - `watch` logs to a rolling file so raw-mode terminal output stays clean;
//!   every other command logs to stderr, keeping stdout for results.

mod args;
mod commands;
mod context;
mod dispatch;
mod error;
mod metrics_exporter;
mod output;

use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use hotkeys_config::ConfigLoader;
use metrics_exporter::MetricsExporter;
use tracing_appender::non_blocking;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_NAME: &str = "hotkeys.log";

#[tokio::main]
async fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = ConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    // Note: log_guard must live until exit so file logs are flushed
    let log_guard = match cli.command.log_dir() {
        Some(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
            let (writer, guard) = non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
            None
        }
    };

    // Initialize metrics exporter if --metrics-bind is provided
    let _metrics_exporter = if let Some(ref bind_addr) = cli.metrics_bind {
        match MetricsExporter::install(bind_addr) {
            Ok(exporter) => {
                tracing::info!(addr = %exporter.bind_addr(), "Serving metrics at /metrics");
                Some(exporter)
            }
            Err(e) => {
                eprintln!("Failed to start metrics exporter: {}", e);
                std::process::exit(ExitCode::GeneralError.as_i32());
            }
        }
    } else {
        None
    };

    let exit_code = match run_command(cli).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    // process::exit skips destructors
    drop(log_guard);
    std::process::exit(exit_code.as_i32());
}
