//! Check command implementation.
//!
//! Responsibilities:
//! - Load a key-map document through the config loader (which validates it).
//! - List every scope and binding in registration order.
//! - Report combinations bound to more than one action in a scope.
//!
//! Does NOT handle:
//! - Dispatching events (see `replay` and `watch`).
//!
//! Invariants:
//! - Conflicts are warnings; the earlier declaration wins at dispatch time,
//!   so a document with conflicts still passes the check.

use std::path::Path;

use anyhow::Result;
use hotkeys_config::{BindingConflict, HotkeysOptions, KeyMapDocument};
use serde::Serialize;
use tracing::{info, warn};

use crate::context::{load_config, require_document};
use crate::output::{OutputFormat, emit};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: Option<String>,
    pub options: HotkeysOptions,
    pub scopes: Vec<ScopeReport>,
    pub conflicts: Vec<ConflictReport>,
}

#[derive(Debug, Serialize)]
pub struct ScopeReport {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub global: bool,
    pub bindings: Vec<BindingReport>,
}

#[derive(Debug, Serialize)]
pub struct BindingReport {
    pub action: String,
    pub combination: String,
    pub trigger: String,
    pub handled: bool,
}

#[derive(Debug, Serialize)]
pub struct ConflictReport {
    pub scope: String,
    pub combination: String,
    pub winner: String,
    pub shadowed: String,
}

impl From<BindingConflict> for ConflictReport {
    fn from(conflict: BindingConflict) -> Self {
        Self {
            scope: conflict.scope,
            combination: conflict.combination,
            winner: conflict.first_action,
            shadowed: conflict.second_action,
        }
    }
}

pub fn run(
    file: Option<&Path>,
    sequence_timeout_ms: Option<u64>,
    output_format: &str,
    output_file: Option<&Path>,
) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let config = load_config(file, sequence_timeout_ms)?;
    let path = config.keymap_path.clone();
    let (options, document) = require_document(config)?;

    let report = build_report(path.as_deref(), options, &document)?;
    for conflict in &report.conflicts {
        warn!(
            scope = %conflict.scope,
            combination = %conflict.combination,
            winner = %conflict.winner,
            shadowed = %conflict.shadowed,
            "Combination bound to more than one action"
        );
    }
    info!(scopes = report.scopes.len(), "Key map is valid");

    let rendered = match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => render_text(&report),
    };
    emit(&rendered, output_file, format)
}

pub fn build_report(
    path: Option<&Path>,
    options: HotkeysOptions,
    document: &KeyMapDocument,
) -> Result<CheckReport> {
    let mut scopes = Vec::with_capacity(document.scopes.len());
    for definition in &document.scopes {
        let handled = definition.handled_actions();
        let bindings = definition
            .parse_bindings()?
            .into_iter()
            .map(|binding| BindingReport {
                handled: handled.contains(&binding.action.as_str()),
                combination: binding.combination.to_string(),
                trigger: binding.combination.trigger().to_string(),
                action: binding.action,
            })
            .collect();
        scopes.push(ScopeReport {
            id: definition.id.clone(),
            parent: definition.parent.clone(),
            global: definition.global,
            bindings,
        });
    }

    Ok(CheckReport {
        path: path.map(|p| p.display().to_string()),
        options,
        scopes,
        conflicts: document
            .find_conflicts()
            .into_iter()
            .map(ConflictReport::from)
            .collect(),
    })
}

fn render_text(report: &CheckReport) -> String {
    let mut out = String::new();
    if let Some(path) = &report.path {
        out.push_str(&format!("Key map: {path}\n"));
    }
    out.push_str(&format!(
        "Sequence timeout: {} ms\n",
        report.options.sequence_timeout.as_millis()
    ));

    let width = report
        .scopes
        .iter()
        .flat_map(|s| s.bindings.iter())
        .map(|b| b.action.len())
        .max()
        .unwrap_or(0);

    for scope in &report.scopes {
        out.push('\n');
        out.push_str(&scope.id);
        match (&scope.parent, scope.global) {
            (Some(parent), true) => out.push_str(&format!(" (global, parent: {parent})")),
            (Some(parent), false) => out.push_str(&format!(" (parent: {parent})")),
            (None, true) => out.push_str(" (global)"),
            (None, false) => {}
        }
        out.push('\n');

        if scope.bindings.is_empty() {
            out.push_str("  (no bindings)\n");
        }
        for binding in &scope.bindings {
            out.push_str(&format!(
                "  {:<width$}  {}",
                binding.action, binding.combination
            ));
            if binding.trigger != "keydown" {
                out.push_str(&format!(" [{}]", binding.trigger));
            }
            if !binding.handled {
                out.push_str(" (no handler)");
            }
            out.push('\n');
        }
    }

    if !report.conflicts.is_empty() {
        out.push_str("\nConflicts:\n");
        for conflict in &report.conflicts {
            out.push_str(&format!(
                "  {}: '{}' is bound to {} and {}; {} wins\n",
                conflict.scope,
                conflict.combination,
                conflict.winner,
                conflict.shadowed,
                conflict.winner
            ));
        }
    }

    let bindings: usize = report.scopes.iter().map(|s| s.bindings.len()).sum();
    out.push_str(&format!(
        "\n{} scopes, {} bindings, {} conflicts\n",
        report.scopes.len(),
        bindings,
        report.conflicts.len()
    ));
    out
}
