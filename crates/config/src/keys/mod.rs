//! Canonical key names.
//!
//! Responsibilities:
//! - Define `KeyName`, the canonical identifier shared by the parser, the
//!   key state tracker and the event normalizer.
//! - Classify modifier keys.
//!
//! Does NOT handle:
//! - Synonym or shifted-symbol lookup (see `aliases`).
//! - Parsing key-map strings (see `combination`).
//!
//! Invariants:
//! - Named keys are lowercase (`ctrl`, `enter`, `pageup`, `f5`).
//! - Printable keys are a single character; letters are lowercase.
//! - The `+` key is always spelled `plus` and the space bar `space`.

pub mod aliases;

use std::borrow::{Borrow, Cow};
use std::fmt;

/// A canonical key name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyName(Cow<'static, str>);

impl KeyName {
    pub const SHIFT: KeyName = KeyName(Cow::Borrowed("shift"));
    pub const CTRL: KeyName = KeyName(Cow::Borrowed("ctrl"));
    pub const ALT: KeyName = KeyName(Cow::Borrowed("alt"));
    pub const META: KeyName = KeyName(Cow::Borrowed("meta"));

    /// Wraps a name that is already canonical.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub(crate) fn owned(name: String) -> Self {
        Self(Cow::Owned(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `shift`, `ctrl`, `alt` and `meta`.
    pub fn is_modifier(&self) -> bool {
        is_modifier(self.as_str())
    }

    /// Ordering rank used when rendering chords: modifiers first, in a fixed order.
    pub(crate) fn display_rank(&self) -> u8 {
        match self.as_str() {
            "ctrl" => 0,
            "alt" => 1,
            "shift" => 2,
            "meta" => 3,
            _ => 4,
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for KeyName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for KeyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns true if `name` is one of the canonical modifier names.
pub fn is_modifier(name: &str) -> bool {
    matches!(name, "shift" | "ctrl" | "alt" | "meta")
}
