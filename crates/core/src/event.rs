//! Raw key events and their normalization.
//!
//! Responsibilities:
//! - Define `RawKeyEvent`, the platform-neutral input accepted by the manager.
//! - Normalize platform key identifiers and legacy key codes into `KeyName`s.
//!
//! Does NOT handle:
//! - Deciding whether an event is ignored (see `manager`).
//! - Tracking held keys (see `state`).
//!
//! Invariants:
//! - A `None` modifier set means the source did not report modifier state;
//!   only reported state is reconciled against held modifiers.

use bitflags::bitflags;
use hotkeys_config::KeyName;
use hotkeys_config::keys::aliases;

bitflags! {
    /// Modifier keys reported alongside an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

impl Modifiers {
    /// Pairs of modifier flag and the canonical key it stands for.
    pub(crate) const KEYS: [(Modifiers, KeyName); 4] = [
        (Modifiers::SHIFT, KeyName::SHIFT),
        (Modifiers::CTRL, KeyName::CTRL),
        (Modifiers::ALT, KeyName::ALT),
        (Modifiers::META, KeyName::META),
    ];

    /// The flag a modifier key stands for; empty for other keys.
    pub fn for_key(key: &KeyName) -> Modifiers {
        Self::KEYS
            .iter()
            .find(|(_, name)| name == key)
            .map_or(Modifiers::empty(), |(flag, _)| *flag)
    }
}

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Down,
    Up,
}

impl KeyEventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            KeyEventKind::Down => "down",
            KeyEventKind::Up => "up",
        }
    }
}

/// The element an event was delivered to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventTarget {
    /// Element tag name, such as `input` or `div`
    pub tag: Option<String>,
    /// Whether the element accepts text editing
    pub editable: bool,
}

impl EventTarget {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            editable: false,
        }
    }

    pub fn editable() -> Self {
        Self {
            tag: None,
            editable: true,
        }
    }
}

/// How the platform identified the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawKey {
    /// A key identifier string (`a`, `A`, `@`, `Shift`, `ArrowUp`, ` `)
    Named(String),
    /// A legacy numeric key code
    Code(u32),
}

/// A key event as delivered by the integration layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub key: RawKey,
    pub kind: KeyEventKind,
    pub modifiers: Option<Modifiers>,
    pub repeat: bool,
    pub target: Option<EventTarget>,
}

impl RawKeyEvent {
    pub fn new(key: RawKey, kind: KeyEventKind) -> Self {
        Self {
            key,
            kind,
            modifiers: None,
            repeat: false,
            target: None,
        }
    }

    /// A key-down event for a key identifier string.
    pub fn down(key: impl Into<String>) -> Self {
        Self::new(RawKey::Named(key.into()), KeyEventKind::Down)
    }

    /// A key-up event for a key identifier string.
    pub fn up(key: impl Into<String>) -> Self {
        Self::new(RawKey::Named(key.into()), KeyEventKind::Up)
    }

    /// An event identified by a legacy numeric key code.
    pub fn from_key_code(code: u32, kind: KeyEventKind) -> Self {
        Self::new(RawKey::Code(code), kind)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// True for a single uppercase letter, which is only typed with shift.
    pub fn implies_shift(&self) -> bool {
        let RawKey::Named(name) = &self.key else {
            return false;
        };
        let mut chars = name.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
    }

    /// Canonical name of the key, or `None` if it is not a key we can bind.
    pub fn key_name(&self) -> Option<KeyName> {
        match &self.key {
            RawKey::Named(name) => match name.as_str() {
                "Dead" | "Unidentified" | "Process" => None,
                name => aliases::canonicalize(name),
            },
            RawKey::Code(code) => aliases::from_key_code(*code),
        }
    }
}

/// A normalized event as seen by the tracker and matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// The key as reported
    pub key: KeyName,
    /// Every name the key stands for under the current shift state
    pub names: Vec<KeyName>,
    pub kind: KeyEventKind,
}

impl KeyInput {
    pub fn new(key: KeyName, shift_held: bool, kind: KeyEventKind) -> Self {
        let names = aliases::resolve(&key, shift_held);
        Self { key, names, kind }
    }

    /// True if this key stands for `name`.
    pub fn represents(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.as_str() == name)
    }

    pub fn is_modifier(&self) -> bool {
        self.key.is_modifier()
    }
}
