//! Dispatch resolution across scopes.
//!
//! Responsibilities:
//! - Consult scopes in dispatch order (focus path, then globals).
//! - Invoke the handler of the first scope with a bound match.
//!
//! Does NOT handle:
//! - Event normalization or ignore rules (see `manager`).
//!
//! Invariants:
//! - Every eligible scope advances its sequence attempts before a winner is chosen.
//! - At most one handler runs per event.

use std::time::Instant;

use crate::event::KeyInput;
use crate::matcher::{self, Candidate, MatchResult};
use crate::metrics::{DispatchTier, record_dispatched};
use crate::registry::{HotkeyEvent, Scope, ScopeId, ScopeRegistry};
use crate::state::{CombinationKey, KeyStateTracker};

/// Outcome of resolving one event across all scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A handler ran.
    Handled {
        scope: ScopeId,
        action: String,
        tier: DispatchTier,
    },
    /// No handler ran but a sequence is waiting for more steps.
    Pending,
    /// An in-progress sequence was broken.
    Reset,
    Unmatched,
}

fn candidates(scope: &Scope) -> impl Iterator<Item = Candidate<'_>> {
    scope
        .key_map
        .bindings()
        .iter()
        .enumerate()
        .map(move |(index, binding)| Candidate {
            key: CombinationKey::new(scope.id.clone(), index),
            action: &binding.action,
            combination: &binding.combination,
            bound: scope.handlers.contains(&binding.action),
        })
}

/// Resolve `input` against every scope and run the winning handler.
pub fn dispatch(
    registry: &mut ScopeRegistry,
    tracker: &mut KeyStateTracker,
    input: &KeyInput,
    now: Instant,
) -> Resolution {
    let order = registry.dispatch_order();
    let mut results = Vec::with_capacity(order.len());
    for (id, tier) in order {
        let Some(scope) = registry.get(id.as_str()) else {
            continue;
        };
        let result = matcher::resolve(tracker, input, candidates(scope), now);
        results.push((id, tier, result));
    }

    let mut pending = false;
    let mut reset = false;
    let mut winner = None;
    for (id, tier, result) in results {
        match result {
            MatchResult::Matched { action, binding } if winner.is_none() => {
                winner = Some((id, tier, action, binding));
            }
            MatchResult::Matched { .. } => {}
            MatchResult::Partial => pending = true,
            MatchResult::Reset => reset = true,
            MatchResult::NoMatch => {}
        }
    }

    if let Some((id, tier, action, binding)) = winner
        && invoke(registry, &id, &action, binding, input)
    {
        tracing::debug!(
            scope = %id,
            action = %action,
            tier = tier.as_str(),
            key = %input.key,
            "Dispatched hotkey"
        );
        record_dispatched(tier);
        return Resolution::Handled {
            scope: id,
            action,
            tier,
        };
    }

    if pending {
        Resolution::Pending
    } else if reset {
        Resolution::Reset
    } else {
        Resolution::Unmatched
    }
}

fn invoke(
    registry: &mut ScopeRegistry,
    id: &ScopeId,
    action: &str,
    binding: usize,
    input: &KeyInput,
) -> bool {
    let Some(Scope {
        id: scope_id,
        key_map,
        handlers,
        ..
    }) = registry.get_mut(id.as_str())
    else {
        return false;
    };
    let Some(bound) = key_map.bindings().get(binding) else {
        return false;
    };
    handlers.invoke(&HotkeyEvent {
        scope: &*scope_id,
        action,
        combination: &bound.combination,
        key: &input.key,
    })
}
