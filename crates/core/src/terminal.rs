//! Crossterm input adapter.
//!
//! Responsibilities:
//! - Translate crossterm `KeyEvent`s into `RawKeyEvent`s for the manager.
//! - Synthesize key-ups for terminals that only report presses.
//!
//! Does NOT handle:
//! - Reading the terminal or enabling raw mode (see the CLI `watch` command).
//!
//! Invariants:
//! - Every translated event carries the modifier flags the terminal reported,
//!   so held modifiers are reconciled on every key.

use ::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

use crate::event::{Modifiers, RawKeyEvent};

/// Converts terminal key events into manager events.
#[derive(Debug, Clone, Copy)]
pub struct CrosstermAdapter {
    synthesize_key_up: bool,
}

impl Default for CrosstermAdapter {
    fn default() -> Self {
        Self {
            synthesize_key_up: true,
        }
    }
}

impl CrosstermAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether each press is followed by a synthesized key-up.
    ///
    /// Turn this off when the terminal reports releases (keyboard
    /// enhancement flags enabled).
    pub fn with_synthesized_key_up(mut self, synthesize: bool) -> Self {
        self.synthesize_key_up = synthesize;
        self
    }

    pub fn synthesizes_key_up(&self) -> bool {
        self.synthesize_key_up
    }

    /// Translate one terminal event. Keys with no binding name yield nothing.
    pub fn translate(&self, event: &KeyEvent) -> Vec<RawKeyEvent> {
        let Some((key, extra)) = key_identifier(event.code) else {
            tracing::trace!(code = ?event.code, "Skipping untranslatable terminal key");
            return Vec::new();
        };
        let modifiers = modifiers_from(event.modifiers) | extra;

        let down = RawKeyEvent::down(key.clone()).with_modifiers(modifiers);
        let up = RawKeyEvent::up(key).with_modifiers(modifiers);
        match event.kind {
            KeyEventKind::Press if self.synthesize_key_up => vec![down, up],
            KeyEventKind::Press => vec![down],
            KeyEventKind::Repeat if self.synthesize_key_up => vec![down.repeated(), up],
            KeyEventKind::Repeat => vec![down.repeated()],
            KeyEventKind::Release => vec![up],
        }
    }
}

/// Map crossterm modifier flags onto ours. Hyper is folded into meta.
pub fn modifiers_from(flags: KeyModifiers) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, flags.contains(KeyModifiers::SHIFT));
    modifiers.set(Modifiers::CTRL, flags.contains(KeyModifiers::CONTROL));
    modifiers.set(Modifiers::ALT, flags.contains(KeyModifiers::ALT));
    modifiers.set(
        Modifiers::META,
        flags.intersects(KeyModifiers::SUPER | KeyModifiers::META | KeyModifiers::HYPER),
    );
    modifiers
}

/// Key identifier for a crossterm key code, plus modifiers the code implies.
fn key_identifier(code: KeyCode) -> Option<(String, Modifiers)> {
    let named = |name: &str| Some((name.to_string(), Modifiers::empty()));
    match code {
        KeyCode::Char(c) if c.is_uppercase() => Some((c.to_string(), Modifiers::SHIFT)),
        KeyCode::Char(c) => Some((c.to_string(), Modifiers::empty())),
        KeyCode::BackTab => Some(("Tab".to_string(), Modifiers::SHIFT)),
        KeyCode::Backspace => named("Backspace"),
        KeyCode::Enter => named("Enter"),
        KeyCode::Left => named("ArrowLeft"),
        KeyCode::Right => named("ArrowRight"),
        KeyCode::Up => named("ArrowUp"),
        KeyCode::Down => named("ArrowDown"),
        KeyCode::Home => named("Home"),
        KeyCode::End => named("End"),
        KeyCode::PageUp => named("PageUp"),
        KeyCode::PageDown => named("PageDown"),
        KeyCode::Tab => named("Tab"),
        KeyCode::Delete => named("Delete"),
        KeyCode::Insert => named("Insert"),
        KeyCode::Esc => named("Escape"),
        KeyCode::CapsLock => named("CapsLock"),
        KeyCode::F(n) if (1..=20).contains(&n) => Some((format!("F{n}"), Modifiers::empty())),
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => named("Shift"),
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => named("Control"),
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => named("Alt"),
            ModifierKeyCode::LeftSuper
            | ModifierKeyCode::RightSuper
            | ModifierKeyCode::LeftMeta
            | ModifierKeyCode::RightMeta
            | ModifierKeyCode::LeftHyper
            | ModifierKeyCode::RightHyper => named("Meta"),
            ModifierKeyCode::IsoLevel3Shift | ModifierKeyCode::IsoLevel5Shift => None,
        },
        _ => None,
    }
}
