//! Watch command implementation.
//!
//! Responsibilities:
//! - Put the terminal in raw mode and read key events from crossterm.
//! - Translate them through `CrosstermAdapter` into the key event manager.
//! - Print each dispatched action until Ctrl+C.
//!
//! Does NOT handle:
//! - Logging setup; `main()` routes logs to a file for this command.
//!
//! Invariants:
//! - Raw mode (and keyboard enhancement, when pushed) is undone by
//!   `TerminalGuard` on every exit path.
//! - Ctrl+C ends the session and is never delivered to the manager.

use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement};
use futures_util::StreamExt;
use hotkeys_config::KeyMapDocument;
use hotkeys_core::{CrosstermAdapter, Handlers, KeyEventManager};
use tracing::{debug, info};

use crate::context::{load_config, require_document};

/// Restores the terminal when the watch session ends, including on panic.
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn new(keyboard_enhanced: bool) -> Self {
        Self { keyboard_enhanced }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Errors are ignored; drop must not panic.
        if self.keyboard_enhanced {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
    }
}

pub async fn run(
    focus: Option<&str>,
    keymap: Option<&Path>,
    sequence_timeout_ms: Option<u64>,
    report_releases: bool,
) -> Result<()> {
    let config = load_config(keymap, sequence_timeout_ms)?;
    let (options, document) = require_document(config)?;

    let printed = Rc::new(RefCell::new(Vec::new()));
    let mut manager = KeyEventManager::new(options);
    manager.register_document(&document, |scope_id| {
        printing_handlers(&document, scope_id, &printed)
    })?;
    if let Some(scope) = focus {
        manager
            .set_focused(scope)
            .with_context(|| format!("Cannot focus '{scope}'"))?;
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let enhanced = report_releases && supports_keyboard_enhancement().unwrap_or(false);
    let _guard = TerminalGuard::new(enhanced);

    let mut stdout = std::io::stdout();
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .context("Failed to enable key release reporting")?;
    } else if report_releases {
        info!("Terminal does not report key releases; synthesizing them");
    }
    let adapter = CrosstermAdapter::new().with_synthesized_key_up(!enhanced);

    write!(
        stdout,
        "Watching {} scopes{}. Press Ctrl+C to exit.\r\n",
        manager.registry().len(),
        focus.map(|s| format!(" (focus: {s})")).unwrap_or_default()
    )?;
    stdout.flush()?;

    let mut events = EventStream::new();
    loop {
        let next = tokio::select! {
            next = events.next() => next,
            _ = tokio::signal::ctrl_c() => break,
        };
        let Some(event) = next else {
            break;
        };
        let Event::Key(key) = event.context("Failed to read terminal event")? else {
            continue;
        };
        if is_exit_key(&key) {
            break;
        }

        for raw in adapter.translate(&key) {
            let outcome = manager.handle_now(&raw);
            debug!(key = ?raw.key, kind = ?raw.kind, outcome = ?outcome, "Handled terminal key");
        }
        for line in printed.borrow_mut().drain(..) {
            write!(stdout, "{line}\r\n")?;
        }
        stdout.flush()?;
    }

    info!("Watch session ended");
    Ok(())
}

fn is_exit_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c')
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && key.kind != KeyEventKind::Release
}

fn printing_handlers(
    document: &KeyMapDocument,
    scope_id: &str,
    printed: &Rc<RefCell<Vec<String>>>,
) -> Handlers {
    let Some(scope) = document.scope(scope_id) else {
        return Handlers::new();
    };
    let mut handlers = Handlers::new();
    for action in scope.handled_actions() {
        let printed = Rc::clone(printed);
        handlers = handlers.on(action, move |event| {
            printed.borrow_mut().push(format!(
                "{}:{}  ({})",
                event.scope, event.action, event.combination
            ));
        });
    }
    handlers
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotkeys_core::RawKeyEvent;

    #[test]
    fn test_exit_key() {
        assert!(is_exit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_exit_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_exit_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_printing_handlers_record_dispatches() {
        let document: KeyMapDocument = serde_json::from_str(
            r#"{ "scopes": [ { "id": "app", "global": true, "key_map": { "save": "ctrl+s", "quit": "q" }, "handlers": ["save"] } ] }"#,
        )
        .unwrap();
        let printed = Rc::new(RefCell::new(Vec::new()));
        let mut manager = KeyEventManager::default();
        manager
            .register_document(&document, |id| printing_handlers(&document, id, &printed))
            .unwrap();

        let adapter = CrosstermAdapter::new();
        for raw in adapter.translate(&KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)) {
            manager.handle_now(&raw);
        }
        manager.handle_now(&RawKeyEvent::down("q"));

        assert_eq!(*printed.borrow(), vec!["app:save  (ctrl+s)".to_string()]);
    }
}
