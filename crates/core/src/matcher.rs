//! Combination matching.
//!
//! Responsibilities:
//! - Advance every candidate combination's sequence attempt for an event.
//! - Pick the most specific completed combination.
//!
//! Does NOT handle:
//! - Scope order across the focus path and global tier (see `dispatch`).
//!
//! Invariants:
//! - Every candidate is advanced, even after a match is found, so parallel
//!   sequences keep consistent progress.
//! - Specificity: more steps, then more keys in the final step, then earlier
//!   declaration.
//! - A completed combination whose action has no handler does not count as a match.

use std::cmp::{Ordering, Reverse};
use std::time::Instant;

use hotkeys_config::Combination;

use crate::event::KeyInput;
use crate::state::{CombinationKey, KeyStateTracker, StepOutcome};

/// One binding offered to the matcher.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub key: CombinationKey,
    pub action: &'a str,
    pub combination: &'a Combination,
    /// Whether a handler is bound for `action`
    pub bound: bool,
}

/// What the latest event did across a set of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A combination completed; `binding` is its declaration index.
    Matched { action: String, binding: usize },
    /// Nothing completed but some sequence is still in progress.
    Partial,
    /// An in-progress sequence was broken and nothing completed.
    Reset,
    NoMatch,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

fn specificity(combination: &Combination, order: usize) -> (usize, usize, Reverse<usize>) {
    (
        combination.step_count(),
        combination.final_step().len(),
        Reverse(order),
    )
}

/// Offer `input` to every candidate, in declaration order, and pick the winner.
pub fn resolve<'a>(
    tracker: &mut KeyStateTracker,
    input: &KeyInput,
    candidates: impl IntoIterator<Item = Candidate<'a>>,
    now: Instant,
) -> MatchResult {
    let mut best: Option<(usize, Candidate<'a>)> = None;
    let mut partial = false;
    let mut broke = false;

    for (order, candidate) in candidates.into_iter().enumerate() {
        match tracker.advance_sequence(&candidate.key, candidate.combination, input, now) {
            StepOutcome::Matched if candidate.bound => {
                let better = match &best {
                    Some((best_order, current)) => {
                        specificity(candidate.combination, order)
                            .cmp(&specificity(current.combination, *best_order))
                            == Ordering::Greater
                    }
                    None => true,
                };
                if better {
                    best = Some((order, candidate));
                }
            }
            StepOutcome::Matched => {
                tracing::trace!(action = candidate.action, "Matched combination has no handler");
            }
            StepOutcome::Partial => partial = true,
            StepOutcome::Failed { broke_sequence } => broke |= broke_sequence,
        }
    }

    match best {
        Some((_, winner)) => MatchResult::Matched {
            action: winner.action.to_string(),
            binding: winner.key.binding,
        },
        None if partial => MatchResult::Partial,
        None if broke => MatchResult::Reset,
        None => MatchResult::NoMatch,
    }
}
