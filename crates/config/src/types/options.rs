//! Runtime options for the key event manager.
//!
//! Responsibilities:
//! - Define `HotkeysOptions`, the resolved option set handed to the manager.
//! - Define `OptionsSection`, the partially-specified form read from key-map documents.
//!
//! Does NOT handle:
//! - Reading options from the environment or files (see `loader`).
//! - Applying the ignore condition to events (see the core crate).
//!
//! Invariants:
//! - Ignored tag names are stored lowercase and compared case-insensitively.
//! - `sequence_timeout` is within the accepted bounds once built by `ConfigLoader`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_IGNORE_REPEATS, DEFAULT_IGNORED_TAGS, DEFAULT_SEQUENCE_TIMEOUT_MS,
    DEFAULT_STOP_PROPAGATION,
};

/// Module for serializing Duration as milliseconds (integer).
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Resolved options for a key event manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeysOptions {
    /// Idle window between steps of a key sequence (serialized as milliseconds)
    #[serde(with = "duration_millis", rename = "sequence_timeout_ms")]
    pub sequence_timeout: Duration,
    /// Event target tags whose key events are ignored
    pub ignored_tags: Vec<String>,
    /// Ignore events whose target is content-editable
    pub ignore_content_editable: bool,
    /// Report handled events as not propagating further
    pub stop_event_propagation_after_handling: bool,
    /// Drop auto-repeated key-downs of a key that is already held
    pub ignore_repeated_events_when_key_held_down: bool,
}

impl Default for HotkeysOptions {
    fn default() -> Self {
        Self {
            sequence_timeout: Duration::from_millis(DEFAULT_SEQUENCE_TIMEOUT_MS),
            ignored_tags: DEFAULT_IGNORED_TAGS.iter().map(|t| t.to_string()).collect(),
            ignore_content_editable: true,
            stop_event_propagation_after_handling: DEFAULT_STOP_PROPAGATION,
            ignore_repeated_events_when_key_held_down: DEFAULT_IGNORE_REPEATS,
        }
    }
}

impl HotkeysOptions {
    /// True if events targeting an element with this tag are ignored.
    pub fn ignores_tag(&self, tag: &str) -> bool {
        self.ignored_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Options as written in a key-map document. Unset fields fall through to
/// environment and default values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsSection {
    #[serde(
        default,
        alias = "sequenceTimeoutMs",
        alias = "sequenceTimeout",
        skip_serializing_if = "Option::is_none"
    )]
    pub sequence_timeout_ms: Option<u64>,
    #[serde(default, alias = "ignoredTags", skip_serializing_if = "Option::is_none")]
    pub ignored_tags: Option<Vec<String>>,
    #[serde(
        default,
        alias = "ignoreContentEditable",
        skip_serializing_if = "Option::is_none"
    )]
    pub ignore_content_editable: Option<bool>,
    #[serde(
        default,
        alias = "stopEventPropagationAfterHandling",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_event_propagation_after_handling: Option<bool>,
    #[serde(
        default,
        alias = "ignoreRepeatedEventsWhenKeyHeldDown",
        skip_serializing_if = "Option::is_none"
    )]
    pub ignore_repeated_events_when_key_held_down: Option<bool>,
}

/// Normalize a list of tag names for storage.
pub(crate) fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_ascii_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = HotkeysOptions::default();
        assert_eq!(options.sequence_timeout, Duration::from_millis(1000));
        assert!(options.ignores_tag("input"));
        assert!(options.ignores_tag("TEXTAREA"));
        assert!(!options.ignores_tag("div"));
        assert!(options.ignore_content_editable);
        assert!(options.stop_event_propagation_after_handling);
        assert!(options.ignore_repeated_events_when_key_held_down);
    }

    #[test]
    fn test_options_serialize_timeout_as_millis() {
        let json = serde_json::to_value(HotkeysOptions::default()).unwrap();
        assert_eq!(json["sequence_timeout_ms"], 1000);
    }

    #[test]
    fn test_section_accepts_camel_case_aliases() {
        let section: OptionsSection = serde_json::from_str(
            r#"{"sequenceTimeout": 500, "stopEventPropagationAfterHandling": false}"#,
        )
        .unwrap();
        assert_eq!(section.sequence_timeout_ms, Some(500));
        assert_eq!(section.stop_event_propagation_after_handling, Some(false));
        assert_eq!(section.ignored_tags, None);
    }

    #[test]
    fn test_section_accepts_millisecond_timeout_name() {
        let section: OptionsSection =
            serde_json::from_str(r#"{"sequenceTimeoutMs": 500}"#).unwrap();
        assert_eq!(section.sequence_timeout_ms, Some(500));
    }

    #[test]
    fn test_huge_timeout_serializes_saturated() {
        let options = HotkeysOptions {
            sequence_timeout: Duration::MAX,
            ..HotkeysOptions::default()
        };
        let json = serde_json::to_value(options).unwrap();
        assert_eq!(json["sequence_timeout_ms"], u64::MAX);
    }

    #[test]
    fn test_section_rejects_unknown_fields() {
        let result: Result<OptionsSection, _> = serde_json::from_str(r#"{"sequence_timout": 5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_tags() {
        assert_eq!(
            normalize_tags(["Input", " select ", "", "INPUT"]),
            vec!["input".to_string(), "select".to_string()]
        );
    }
}
