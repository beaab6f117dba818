//! Shared test utilities for hotkeys CLI integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Locate the key-map and script fixtures.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper are hermetic by default.
//! - No `HOTKEYS_*` variable leaks in from the host environment.

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;

/// Returns a hermetic `hotkeys` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `HOTKEYS_*` and `RUST_LOG` are cleared so host settings cannot change results.
pub fn hotkeys_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("hotkeys");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    clear_hotkeys_env(&mut cmd);
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Clear every `HOTKEYS_*` variable inherited from the host.
pub fn clear_hotkeys_env(cmd: &mut Command) {
    for (key, _) in std::env::vars() {
        if key.starts_with("HOTKEYS_") {
            cmd.env_remove(&key);
        }
    }
}

/// Path to a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Fixture path as a string argument.
pub fn fixture_arg(name: &str) -> String {
    fixture(name).display().to_string()
}
