//! Architecture tests for crate layering.
//!
//! Invariants:
//! - `hotkeys-config` depends on no other workspace crate.
//! - `hotkeys-core` depends only on `hotkeys-config`, and pulls in no async
//!   runtime or CLI stack.
//! - Library code outside `#[cfg(test)]` never calls `unwrap()` or `expect()`.

use std::fs;
use std::path::{Path, PathBuf};

fn crate_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("architecture-tests lives under crates/")
        .join(name)
}

/// Names in the `[dependencies]` table of a crate manifest.
fn dependencies(name: &str) -> Vec<String> {
    let manifest = fs::read_to_string(crate_dir(name).join("Cargo.toml"))
        .expect("Failed to read Cargo.toml");
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for line in manifest.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_dependencies = trimmed == "[dependencies]";
            continue;
        }
        if !in_dependencies || trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((dep, _)) = trimmed.split_once('=') {
            names.push(dep.trim().to_string());
        }
    }
    names
}

#[test]
fn test_config_has_no_workspace_dependencies() {
    let deps = dependencies("config");
    assert!(!deps.is_empty());
    assert!(
        deps.iter().all(|d| !d.starts_with("hotkeys-")),
        "hotkeys-config must not depend on other workspace crates: {deps:?}"
    );
}

#[test]
fn test_core_stays_runtime_free() {
    let deps = dependencies("core");
    assert!(deps.contains(&"hotkeys-config".to_string()));
    for forbidden in ["hotkeys-cli", "tokio", "clap", "anyhow", "tracing-subscriber"] {
        assert!(
            !deps.iter().any(|d| d == forbidden),
            "hotkeys-core must not depend on {forbidden}"
        );
    }
}

/// Lines of `path` before its first `#[cfg(test)]`, without comment lines.
fn library_lines(path: &Path) -> Vec<(usize, String)> {
    let content = fs::read_to_string(path).expect("Failed to read file");
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

#[test]
fn test_library_code_does_not_panic_on_errors() {
    let mut violations = Vec::new();

    for name in ["config", "core"] {
        let src = crate_dir(name).join("src");
        for entry in walkdir::WalkDir::new(&src)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        {
            let path_str = entry.path().to_string_lossy();
            if path_str.contains("/tests/") {
                continue;
            }
            for (line_no, line) in library_lines(entry.path()) {
                if line.contains(".unwrap()") || line.contains(".expect(") {
                    violations.push(format!("{}:{}: {}", entry.path().display(), line_no, line.trim()));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Library code must propagate errors instead of panicking:\n{}",
        violations.join("\n")
    );
}
