//! Key combination parsing.
//!
//! Responsibilities:
//! - Parse key-map entries (`"ctrl+s"`, `"g g"`, `["up", "k"]`) into
//!   structured [`Combination`]s.
//! - Render combinations back into their canonical string form.
//!
//! Does NOT handle:
//! - Matching combinations against live key state (see the core crate).
//! - Scope or handler bookkeeping.
//!
//! Grammar: `+` joins keys pressed together into one chord step, whitespace
//! separates steps of a sequence. Whitespace around `+` is ignored, so
//! `ctrl + s` is a single chord. The `+` key itself is spelled `plus`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::{KeyName, aliases};

/// Errors that can occur when parsing a key-map entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The entry contained no keys at all.
    #[error("Key combination is empty")]
    Empty,

    /// A `+` with nothing on one side, such as `ctrl++` or `+a`.
    #[error("Invalid key syntax: '{entry}' contains an empty key. Use 'plus' for the + key")]
    EmptyToken {
        /// The full entry being parsed
        entry: String,
    },

    /// A token that is neither a known key name nor a single character.
    #[error("Unknown key name: '{name}' in '{entry}'")]
    UnknownKey {
        /// The unknown token
        name: String,
        /// The full entry being parsed
        entry: String,
    },
}

/// Which key event completes a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerOn {
    #[default]
    #[serde(alias = "key_down")]
    KeyDown,
    #[serde(alias = "key_up")]
    KeyUp,
}

impl fmt::Display for TriggerOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyDown => write!(f, "keydown"),
            Self::KeyUp => write!(f, "keyup"),
        }
    }
}

/// A set of keys that must be held down at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChordStep {
    keys: BTreeSet<KeyName>,
}

impl ChordStep {
    fn new(keys: BTreeSet<KeyName>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> impl Iterator<Item = &KeyName> {
        self.keys.iter()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; a parsed step holds at least one key.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True if the step names a symbol that is typed with shift (`@`, `?`).
    pub fn has_shifted_symbol(&self) -> bool {
        self.keys.iter().any(|k| aliases::is_shifted_symbol(k.as_str()))
    }

    /// Modifiers named by this step.
    pub fn modifiers(&self) -> impl Iterator<Item = &KeyName> {
        self.keys.iter().filter(|k| k.is_modifier())
    }
}

impl fmt::Display for ChordStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&KeyName> = self.keys.iter().collect();
        keys.sort_by_key(|k| (k.display_rank(), *k));
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// An ordered sequence of chord steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    steps: Vec<ChordStep>,
    trigger: TriggerOn,
}

impl Combination {
    pub fn steps(&self) -> &[ChordStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&ChordStep> {
        self.steps.get(index)
    }

    /// Number of steps; always at least one.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn final_step(&self) -> &ChordStep {
        // Parsing rejects empty entries, so there is always a last step.
        &self.steps[self.steps.len() - 1]
    }

    pub fn trigger(&self) -> TriggerOn {
        self.trigger
    }

    pub fn with_trigger(mut self, trigger: TriggerOn) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn is_sequence(&self) -> bool {
        self.steps.len() > 1
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for Combination {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_combination(s)
    }
}

/// Parse a single key-map entry into a key-down combination.
///
/// # Examples
///
/// ```
/// use hotkeys_config::combination::parse_combination;
///
/// let combo = parse_combination("Control + S").unwrap();
/// assert_eq!(combo.to_string(), "ctrl+s");
///
/// let combo = parse_combination("g g").unwrap();
/// assert_eq!(combo.step_count(), 2);
/// ```
pub fn parse_combination(entry: &str) -> Result<Combination, ParseError> {
    let step_strings = split_steps(entry);
    if step_strings.is_empty() {
        return Err(ParseError::Empty);
    }

    let steps = step_strings
        .iter()
        .map(|step| parse_step(step, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Combination {
        steps,
        trigger: TriggerOn::KeyDown,
    })
}

/// Group whitespace-separated parts into chord strings, gluing parts that
/// are joined by a `+` on either side.
fn split_steps(entry: &str) -> Vec<String> {
    let mut steps: Vec<String> = Vec::new();
    for part in entry.split_whitespace() {
        match steps.last_mut() {
            Some(current) if current.ends_with('+') || part.starts_with('+') => {
                current.push_str(part);
            }
            _ => steps.push(part.to_string()),
        }
    }
    steps
}

fn parse_step(step: &str, entry: &str) -> Result<ChordStep, ParseError> {
    let mut keys = BTreeSet::new();
    for token in step.split('+') {
        if token.is_empty() {
            return Err(ParseError::EmptyToken {
                entry: entry.to_string(),
            });
        }

        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && c.is_ascii_uppercase()
        {
            keys.insert(KeyName::SHIFT);
        }

        let key = aliases::canonicalize(token).ok_or_else(|| ParseError::UnknownKey {
            name: token.to_string(),
            entry: entry.to_string(),
        })?;
        keys.insert(key);
    }
    Ok(ChordStep::new(keys))
}

/// A key-map entry as it appears in a key-map document.
///
/// A plain string is one combination, a list holds alternatives for the same
/// action, and the detailed form selects the event type that fires it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    Sequence(String),
    Detailed {
        sequence: String,
        #[serde(default)]
        action: TriggerOn,
    },
    Alternatives(Vec<KeySpec>),
}

impl KeySpec {
    /// Parse every alternative, preserving declaration order.
    pub fn parse(&self) -> Result<Vec<Combination>, ParseError> {
        let mut out = Vec::new();
        self.collect_into(&mut out)?;
        if out.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(out)
    }

    fn collect_into(&self, out: &mut Vec<Combination>) -> Result<(), ParseError> {
        match self {
            Self::Sequence(entry) => out.push(parse_combination(entry)?),
            Self::Detailed { sequence, action } => {
                out.push(parse_combination(sequence)?.with_trigger(*action));
            }
            Self::Alternatives(specs) => {
                for spec in specs {
                    spec.collect_into(out)?;
                }
            }
        }
        Ok(())
    }
}

impl From<&str> for KeySpec {
    fn from(entry: &str) -> Self {
        Self::Sequence(entry.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for KeySpec {
    fn from(entries: [&str; N]) -> Self {
        Self::Alternatives(entries.iter().map(|e| Self::from(*e)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of(step: &ChordStep) -> Vec<&str> {
        step.keys().map(KeyName::as_str).collect()
    }

    #[test]
    fn test_parse_single_key() {
        let combo = parse_combination("a").unwrap();
        assert_eq!(combo.step_count(), 1);
        assert_eq!(keys_of(combo.final_step()), vec!["a"]);
        assert_eq!(combo.trigger(), TriggerOn::KeyDown);
    }

    #[test]
    fn test_parse_chord_with_synonyms() {
        let combo = parse_combination("Control+Shift+S").unwrap();
        assert_eq!(combo.step_count(), 1);
        assert!(combo.final_step().contains("ctrl"));
        assert!(combo.final_step().contains("shift"));
        assert!(combo.final_step().contains("s"));
        assert_eq!(combo.to_string(), "ctrl+shift+s");
    }

    #[test]
    fn test_parse_sequence() {
        let combo = parse_combination("g g").unwrap();
        assert_eq!(combo.step_count(), 2);
        assert!(combo.is_sequence());
        assert_eq!(combo.to_string(), "g g");
    }

    #[test]
    fn test_parse_sequence_of_chords() {
        let combo = parse_combination("ctrl+k  ctrl+c").unwrap();
        assert_eq!(combo.step_count(), 2);
        assert_eq!(combo.to_string(), "ctrl+k ctrl+c");
    }

    #[test]
    fn test_whitespace_around_plus_is_a_chord() {
        let combo = parse_combination("ctrl + x").unwrap();
        assert_eq!(combo.step_count(), 1);
        assert_eq!(combo.to_string(), "ctrl+x");
    }

    #[test]
    fn test_uppercase_letter_implies_shift() {
        let combo = parse_combination("A").unwrap();
        assert_eq!(keys_of(combo.final_step()), vec!["a", "shift"]);
        assert_eq!(combo.to_string(), "shift+a");
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let combo = parse_combination("shift+A").unwrap();
        assert_eq!(combo.final_step().len(), 2);
    }

    #[test]
    fn test_shifted_symbol_is_kept_verbatim() {
        let combo = parse_combination("@").unwrap();
        assert_eq!(keys_of(combo.final_step()), vec!["@"]);
        assert!(combo.final_step().has_shifted_symbol());
        assert!(!parse_combination("2").unwrap().final_step().has_shifted_symbol());
    }

    #[test]
    fn test_plus_key_is_spelled_out() {
        let combo = parse_combination("ctrl+plus").unwrap();
        assert!(combo.final_step().contains("plus"));
        assert_eq!(combo.to_string(), "ctrl+plus");
    }

    #[test]
    fn test_empty_entry() {
        assert_eq!(parse_combination(""), Err(ParseError::Empty));
        assert_eq!(parse_combination("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_empty_token() {
        assert!(matches!(
            parse_combination("ctrl++"),
            Err(ParseError::EmptyToken { .. })
        ));
        assert!(matches!(
            parse_combination("+a"),
            Err(ParseError::EmptyToken { .. })
        ));
        assert!(matches!(
            parse_combination("a+"),
            Err(ParseError::EmptyToken { .. })
        ));
    }

    #[test]
    fn test_unknown_key() {
        let err = parse_combination("ctrl+hyper").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownKey {
                name: "hyper".to_string(),
                entry: "ctrl+hyper".to_string(),
            }
        );
    }

    #[test]
    fn test_from_str() {
        let combo: Combination = "alt+up".parse().unwrap();
        assert_eq!(combo.to_string(), "alt+up");
    }

    #[test]
    fn test_display_is_reparseable() {
        for entry in ["Meta+Alt+Ctrl+Shift+x", "esc", "a b c", "ctrl+plus =", "?"] {
            let combo = parse_combination(entry).unwrap();
            let reparsed = parse_combination(&combo.to_string()).unwrap();
            assert_eq!(combo, reparsed, "{entry}");
        }
    }

    #[test]
    fn test_key_spec_alternatives_keep_order() {
        let spec = KeySpec::from(["up", "k"]);
        let combos = spec.parse().unwrap();
        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].to_string(), "up");
        assert_eq!(combos[1].to_string(), "k");
    }

    #[test]
    fn test_key_spec_empty_alternatives() {
        assert_eq!(KeySpec::Alternatives(vec![]).parse(), Err(ParseError::Empty));
    }

    #[test]
    fn test_key_spec_deserializes_all_forms() {
        let spec: KeySpec = serde_json::from_str(r#""ctrl+s""#).unwrap();
        assert_eq!(spec, KeySpec::from("ctrl+s"));

        let spec: KeySpec = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(spec.parse().unwrap().len(), 2);

        let spec: KeySpec =
            serde_json::from_str(r#"{"sequence": "space", "action": "keyup"}"#).unwrap();
        let combos = spec.parse().unwrap();
        assert_eq!(combos[0].trigger(), TriggerOn::KeyUp);

        let spec: KeySpec = serde_json::from_str(r#"{"sequence": "space"}"#).unwrap();
        assert_eq!(spec.parse().unwrap()[0].trigger(), TriggerOn::KeyDown);
    }
}
