//! Replay command implementation.
//!
//! Responsibilities:
//! - Parse replay scripts: one command per line, `#` starts a comment
//!   (so the `#` key is written `hash`).
//! - Register the key-map document with a fresh manager whose handlers record
//!   every dispatched action.
//! - Feed the scripted events through the manager on a virtual clock.
//!
//! Does NOT handle:
//! - Real keyboard input (see `watch`).
//!
//! Invariants:
//! - Time only moves on `wait`, so replays are deterministic.
//! - A script is fully parsed before any event is delivered.
//!
//! Script commands:
//!
//! ```text
//! focus <scope>        focus a scope
//! blur                 clear focus
//! wait <ms>            advance the virtual clock
//! down <key>           key-down
//! up <key>             key-up
//! repeat <key>         auto-repeated key-down
//! press <k1+k2+...>    hold each key in order, then release in reverse
//! type <k1> <k2> ...   press and release each key in turn
//! target <tag>|editable|none
//!                      event target for the following events
//! ```

use std::cell::{Cell, RefCell};
use std::io::Read;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use hotkeys_config::{HotkeysOptions, KeyMapDocument};
use hotkeys_core::{
    DispatchOutcome, EventTarget, Handlers, IgnoreReason, KeyEventManager, RawKeyEvent,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::context::{load_config, require_document};
use crate::output::{OutputFormat, emit};

/// Errors in a replay script.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' expects {expected}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: invalid wait duration '{value}'")]
    InvalidWait { line: usize, value: String },

    #[error("line {line}: '{key}' is not a bindable key")]
    UnknownKey { line: usize, key: String },
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Focus(String),
    Blur,
    Wait(Duration),
    Down(String),
    Up(String),
    Repeat(String),
    Press(Vec<String>),
    Type(Vec<String>),
    Target(Option<EventTarget>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub step: Step,
}

/// An action dispatched during a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fired {
    pub line: usize,
    pub at_ms: u64,
    pub scope: String,
    pub action: String,
    pub combination: String,
    pub key: String,
}

pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let content = raw.split_once('#').map_or(raw, |(before, _)| before).trim();
        let mut words = content.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        let step = match command {
            "focus" => Step::Focus(single(line, "focus", "a scope id", &args)?),
            "blur" => Step::Blur,
            "wait" => {
                let value = single(line, "wait", "a duration in milliseconds", &args)?;
                let millis = value
                    .trim_end_matches("ms")
                    .parse::<u64>()
                    .map_err(|_| ScriptError::InvalidWait { line, value })?;
                Step::Wait(Duration::from_millis(millis))
            }
            "down" => Step::Down(single(line, "down", "a key", &args)?),
            "up" => Step::Up(single(line, "up", "a key", &args)?),
            "repeat" => Step::Repeat(single(line, "repeat", "a key", &args)?),
            "press" => {
                let chord = single(line, "press", "keys joined by '+'", &args)?;
                Step::Press(chord.split('+').map(str::to_string).collect())
            }
            "type" => {
                if args.is_empty() {
                    return Err(ScriptError::MissingArgument {
                        line,
                        command: "type",
                        expected: "one or more keys",
                    });
                }
                Step::Type(args.iter().map(|k| k.to_string()).collect())
            }
            "target" => {
                let value = single(line, "target", "a tag name, 'editable' or 'none'", &args)?;
                Step::Target(match value.as_str() {
                    "none" => None,
                    "editable" => Some(EventTarget::editable()),
                    tag => Some(EventTarget::tag(tag)),
                })
            }
            other => {
                return Err(ScriptError::UnknownCommand {
                    line,
                    command: other.to_string(),
                });
            }
        };
        lines.push(ScriptLine { line, step });
    }
    Ok(lines)
}

fn single(
    line: usize,
    command: &'static str,
    expected: &'static str,
    args: &[&str],
) -> Result<String, ScriptError> {
    match args {
        [value] if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ScriptError::MissingArgument {
            line,
            command,
            expected,
        }),
    }
}

/// Position of the replay, shared with the recording handlers.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    line: usize,
    elapsed: Duration,
}

/// A manager loaded from a document, driven by a virtual clock.
pub struct ReplaySession {
    manager: KeyEventManager,
    start: Instant,
    cursor: Rc<Cell<Cursor>>,
    fired: Rc<RefCell<Vec<Fired>>>,
    target: Option<EventTarget>,
}

impl ReplaySession {
    pub fn new(options: HotkeysOptions, document: &KeyMapDocument) -> Result<Self> {
        let cursor = Rc::new(Cell::new(Cursor::default()));
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut manager = KeyEventManager::new(options);

        manager.register_document(document, |scope_id| {
            let actions = document
                .scope(scope_id)
                .map(|scope| scope.handled_actions())
                .unwrap_or_default();
            recording_handlers(&actions, &cursor, &fired)
        })?;

        Ok(Self {
            manager,
            start: Instant::now(),
            cursor,
            fired,
            target: None,
        })
    }

    pub fn focus(&mut self, scope: &str) -> Result<()> {
        self.manager.set_focused(scope)?;
        Ok(())
    }

    /// Run every line and return the actions dispatched, in order.
    pub fn run(&mut self, lines: &[ScriptLine]) -> Result<Vec<Fired>> {
        for script_line in lines {
            let mut cursor = self.cursor.get();
            cursor.line = script_line.line;
            self.cursor.set(cursor);

            self.apply(script_line)
                .with_context(|| format!("Replay failed at line {}", script_line.line))?;
        }
        Ok(self.fired.borrow_mut().drain(..).collect())
    }

    fn apply(&mut self, script_line: &ScriptLine) -> Result<()> {
        match &script_line.step {
            Step::Focus(scope) => self.focus(scope)?,
            Step::Blur => self.manager.clear_focus(),
            Step::Wait(duration) => {
                let mut cursor = self.cursor.get();
                cursor.elapsed += *duration;
                self.cursor.set(cursor);
            }
            Step::Down(key) => self.deliver(script_line.line, key, RawKeyEvent::down(key.as_str()))?,
            Step::Up(key) => self.deliver(script_line.line, key, RawKeyEvent::up(key.as_str()))?,
            Step::Repeat(key) => {
                self.deliver(script_line.line, key, RawKeyEvent::down(key.as_str()).repeated())?
            }
            Step::Press(keys) => {
                for key in keys {
                    self.deliver(script_line.line, key, RawKeyEvent::down(key.as_str()))?;
                }
                for key in keys.iter().rev() {
                    self.deliver(script_line.line, key, RawKeyEvent::up(key.as_str()))?;
                }
            }
            Step::Type(keys) => {
                for key in keys {
                    self.deliver(script_line.line, key, RawKeyEvent::down(key.as_str()))?;
                    self.deliver(script_line.line, key, RawKeyEvent::up(key.as_str()))?;
                }
            }
            Step::Target(target) => self.target = target.clone(),
        }
        Ok(())
    }

    fn deliver(&mut self, line: usize, key: &str, event: RawKeyEvent) -> Result<(), ScriptError> {
        let event = match &self.target {
            Some(target) => event.with_target(target.clone()),
            None => event,
        };
        let now = self.start + self.cursor.get().elapsed;
        let outcome = self.manager.handle(&event, now);
        debug!(line, key, outcome = ?outcome, "Replayed event");

        if outcome == DispatchOutcome::Ignored(IgnoreReason::UnknownKey) {
            return Err(ScriptError::UnknownKey {
                line,
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

fn recording_handlers(
    actions: &[&str],
    cursor: &Rc<Cell<Cursor>>,
    fired: &Rc<RefCell<Vec<Fired>>>,
) -> Handlers {
    let mut handlers = Handlers::new();
    for action in actions {
        let cursor = Rc::clone(cursor);
        let fired = Rc::clone(fired);
        handlers = handlers.on(*action, move |event| {
            let position = cursor.get();
            fired.borrow_mut().push(Fired {
                line: position.line,
                at_ms: u64::try_from(position.elapsed.as_millis()).unwrap_or(u64::MAX),
                scope: event.scope.to_string(),
                action: event.action.to_string(),
                combination: event.combination.to_string(),
                key: event.key.to_string(),
            });
        });
    }
    handlers
}

fn read_script(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read replay script from stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay script at {}", path.display()))
}

pub fn run(
    script: &Path,
    focus: Option<&str>,
    keymap: Option<&Path>,
    sequence_timeout_ms: Option<u64>,
    output_format: &str,
    output_file: Option<&Path>,
) -> Result<()> {
    let format = OutputFormat::from_str(output_format)?;
    let lines = parse_script(&read_script(script)?)?;

    let config = load_config(keymap, sequence_timeout_ms)?;
    let (options, document) = require_document(config)?;

    let mut session = ReplaySession::new(options, &document)?;
    if let Some(scope) = focus {
        session
            .focus(scope)
            .with_context(|| format!("Cannot focus '{scope}'"))?;
    }
    let fired = session.run(&lines)?;

    let rendered = match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&fired)?),
        OutputFormat::Text => render_text(&fired),
    };
    emit(&rendered, output_file, format)
}

fn render_text(fired: &[Fired]) -> String {
    let mut out = String::new();
    for entry in fired {
        out.push_str(&format!(
            "{:>6} ms  {}:{}  ({})\n",
            entry.at_ms, entry.scope, entry.action, entry.combination
        ));
    }
    out.push_str(&format!("{} actions dispatched\n", fired.len()));
    out
}
