//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the matching command handler.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Logging and metrics setup (see `main()`).
//!
//! Invariants:
//! - Commands are routed based on the top-level Commands enum variant.
//! - An explicit `check FILE` argument takes precedence over `--keymap`.

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;

/// Dispatch CLI commands to their respective handlers.
pub(crate) async fn run_command(cli: Cli) -> Result<()> {
    let keymap = cli.keymap.as_deref();
    let output_file = cli.output_file.as_deref();

    match &cli.command {
        Commands::Check { file } => {
            commands::check::run(
                file.as_deref().or(keymap),
                cli.sequence_timeout_ms,
                &cli.output,
                output_file,
            )?;
        }
        Commands::Replay { script, focus } => {
            commands::replay::run(
                script,
                focus.as_deref(),
                keymap,
                cli.sequence_timeout_ms,
                &cli.output,
                output_file,
            )?;
        }
        Commands::Watch {
            focus,
            report_releases,
            ..
        } => {
            commands::watch::run(
                focus.as_deref(),
                keymap,
                cli.sequence_timeout_ms,
                *report_releases,
            )
            .await?;
        }
    }

    Ok(())
}
