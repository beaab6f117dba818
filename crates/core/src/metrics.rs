//! Metrics for key event handling.
//!
//! This module records counters for the event manager:
//! - Events received and events ignored (by reason)
//! - Handlers dispatched (by scope tier)
//! - Sequence attempts reset (by cause)
//!
//! # What this module does NOT handle:
//! - Metrics exposition/export (the CLI installs `metrics-exporter-prometheus`)
//!
//! # Invariants
//! - Metric names are centralized here; label values come from `as_str` enums.
//! - Zero-cost when no metrics recorder is installed

/// Metric name for the total key event counter.
pub const METRIC_EVENTS_TOTAL: &str = "hotkeys_events_total";

/// Metric name for the dispatched handler counter.
pub const METRIC_DISPATCHED_TOTAL: &str = "hotkeys_dispatched_total";

/// Metric name for the sequence reset counter.
pub const METRIC_SEQUENCE_RESETS_TOTAL: &str = "hotkeys_sequence_resets_total";

/// Metric name for the ignored event counter.
pub const METRIC_IGNORED_EVENTS_TOTAL: &str = "hotkeys_ignored_events_total";

/// Which registration tier a handler was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchTier {
    /// A scope on the focus path
    Focus,
    /// A global scope
    Global,
}

impl DispatchTier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DispatchTier::Focus => "focus",
            DispatchTier::Global => "global",
        }
    }
}

/// Why an event was not dispatched at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// The ignore condition matched the event target
    Target,
    /// An auto-repeated key-down of a held key
    Repeat,
    /// The key could not be mapped to a known key name
    UnknownKey,
}

impl IgnoreReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Target => "target",
            IgnoreReason::Repeat => "repeat",
            IgnoreReason::UnknownKey => "unknown_key",
        }
    }
}

/// Why an in-progress sequence attempt went back to its first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetCause {
    Timeout,
    Broken,
}

impl ResetCause {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResetCause::Timeout => "timeout",
            ResetCause::Broken => "broken",
        }
    }
}

pub(crate) fn record_event(kind: &'static str) {
    metrics::counter!(METRIC_EVENTS_TOTAL, "kind" => kind).increment(1);
}

pub(crate) fn record_ignored(reason: IgnoreReason) {
    metrics::counter!(METRIC_IGNORED_EVENTS_TOTAL, "reason" => reason.as_str()).increment(1);
}

pub(crate) fn record_dispatched(tier: DispatchTier) {
    metrics::counter!(METRIC_DISPATCHED_TOTAL, "tier" => tier.as_str()).increment(1);
}

pub(crate) fn record_sequence_reset(cause: ResetCause) {
    metrics::counter!(METRIC_SEQUENCE_RESETS_TOTAL, "cause" => cause.as_str()).increment(1);
}
