//! Key state tracking.
//!
//! Responsibilities:
//! - Track which keys are held, and every name each held key stands for.
//! - Track per-combination sequence progress with timeout resets.
//! - Decide whether the current chord satisfies a combination step.
//!
//! Does NOT handle:
//! - Choosing between competing combinations (see `matcher`).
//! - Scope order or handler invocation (see `dispatch`).
//!
//! Invariants:
//! - Held keys are updated before any sequence attempt sees the event.
//! - Key-ups and modifier key-downs never break an in-progress key-down sequence.
//! - A step is satisfied only when every step key is held, the triggering key
//!   is one of them, and no held modifier lies outside the step (shift is
//!   allowed when the step names a shifted symbol).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use hotkeys_config::keys::aliases;
use hotkeys_config::{ChordStep, Combination, KeyName, TriggerOn};

use crate::event::{KeyEventKind, KeyInput, Modifiers};
use crate::metrics::{ResetCause, record_sequence_reset};
use crate::registry::ScopeId;

/// Identifies one binding of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombinationKey {
    pub scope: ScopeId,
    pub binding: usize,
}

impl CombinationKey {
    pub fn new(scope: ScopeId, binding: usize) -> Self {
        Self { scope, binding }
    }
}

/// Result of offering one event to one combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The final step was satisfied; progress starts over.
    Matched,
    /// The sequence is in progress and waiting for its next step.
    Partial,
    /// The event did not advance the combination. `broke_sequence` is set
    /// when an in-progress attempt was discarded.
    Failed { broke_sequence: bool },
}

/// A held key and the names it currently stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldKey {
    pub key: KeyName,
    pub names: Vec<KeyName>,
}

impl HeldKey {
    fn represents(&self, name: &str) -> bool {
        self.key.as_str() == name || self.names.iter().any(|n| n.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy)]
struct SequenceAttempt {
    progress: usize,
    last_step_at: Instant,
}

/// Held keys plus sequence progress for every combination.
#[derive(Debug)]
pub struct KeyStateTracker {
    held: Vec<HeldKey>,
    /// Keys that were held just before the most recent key-up.
    released_chord: Vec<HeldKey>,
    last_event_at: Option<Instant>,
    attempts: HashMap<CombinationKey, SequenceAttempt>,
    timeout: Duration,
}

impl KeyStateTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            held: Vec::new(),
            released_chord: Vec::new(),
            last_event_at: None,
            attempts: HashMap::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Record a key going down. Returns true if it was already held.
    pub fn on_key_down(&mut self, key: KeyName, names: Vec<KeyName>, now: Instant) -> bool {
        self.last_event_at = Some(now);
        if let Some(held) = self.held.iter_mut().find(|h| h.key == key) {
            held.names = names;
            return true;
        }
        self.held.push(HeldKey { key, names });
        false
    }

    /// Record a key coming up. Returns true if any held key was released.
    ///
    /// Releases the key itself, any held key that stands for it, and every
    /// physical key a shifted symbol can be typed on.
    pub fn on_key_up(&mut self, key: &KeyName, now: Instant) -> bool {
        self.last_event_at = Some(now);
        self.released_chord = self.held.clone();

        let bases = aliases::unshifted_keys(key.as_str());
        let before = self.held.len();
        self.held.retain(|held| {
            !(held.represents(key.as_str()) || bases.iter().any(|b| *b == held.key.as_str()))
        });
        before != self.held.len()
    }

    /// Drop a held key without recording a release chord.
    pub fn release(&mut self, key: &KeyName) -> bool {
        let before = self.held.len();
        self.held.retain(|held| held.key != *key);
        before != self.held.len()
    }

    /// Bring held modifiers in line with the flags an event reported.
    /// Flags in `skip` are left untouched.
    pub fn sync_modifiers(&mut self, modifiers: Modifiers, skip: Modifiers, now: Instant) {
        for (flag, name) in Modifiers::KEYS {
            if skip.contains(flag) {
                continue;
            }
            let held = self.is_down(name.as_str());
            if modifiers.contains(flag) && !held {
                tracing::trace!(modifier = %name, "Modifier reported without key-down");
                self.on_key_down(name.clone(), vec![name], now);
            } else if !modifiers.contains(flag) && held {
                tracing::trace!(modifier = %name, "Modifier released without key-up");
                self.release(&name);
            }
        }
    }

    /// Physical keys currently held, in press order.
    pub fn currently_down(&self) -> impl Iterator<Item = &KeyName> {
        self.held.iter().map(|h| &h.key)
    }

    /// True if some held key stands for `name`.
    pub fn is_down(&self, name: &str) -> bool {
        self.held.iter().any(|h| h.represents(name))
    }

    pub fn last_event_at(&self) -> Option<Instant> {
        self.last_event_at
    }

    /// Current progress (completed steps) of a combination attempt.
    pub fn progress(&self, key: &CombinationKey) -> usize {
        self.attempts.get(key).map_or(0, |a| a.progress)
    }

    /// Offer the latest event to one combination and advance its attempt.
    pub fn advance_sequence(
        &mut self,
        key: &CombinationKey,
        combination: &Combination,
        input: &KeyInput,
        now: Instant,
    ) -> StepOutcome {
        let timeout = self.timeout;
        let mut attempt = self.attempts.get(key).copied().unwrap_or(SequenceAttempt {
            progress: 0,
            last_step_at: now,
        });

        if attempt.progress > 0 && now.saturating_duration_since(attempt.last_step_at) > timeout {
            tracing::trace!(
                scope = %key.scope,
                binding = key.binding,
                combination = %combination,
                "Sequence timed out"
            );
            record_sequence_reset(ResetCause::Timeout);
            attempt.progress = 0;
        }

        let chord = match input.kind {
            KeyEventKind::Down => &self.held,
            KeyEventKind::Up => &self.released_chord,
        };

        let outcome = if !fires_on(combination.trigger(), input.kind) {
            waiting(attempt.progress)
        } else if combination
            .step(attempt.progress)
            .is_some_and(|step| step_satisfied(step, chord, input))
        {
            attempt.progress += 1;
            attempt.last_step_at = now;
            if attempt.progress == combination.step_count() {
                attempt.progress = 0;
                StepOutcome::Matched
            } else {
                StepOutcome::Partial
            }
        } else if input.is_modifier() {
            waiting(attempt.progress)
        } else {
            let broke = attempt.progress > 0;
            attempt.progress = 0;
            // The breaking key may itself start the sequence again.
            if broke
                && combination.step(0).is_some_and(|step| step_satisfied(step, chord, input))
            {
                attempt.progress = 1;
                attempt.last_step_at = now;
                if combination.step_count() == 1 {
                    attempt.progress = 0;
                    StepOutcome::Matched
                } else {
                    StepOutcome::Partial
                }
            } else {
                if broke {
                    record_sequence_reset(ResetCause::Broken);
                }
                StepOutcome::Failed {
                    broke_sequence: broke,
                }
            }
        };

        if outcome == StepOutcome::Partial {
            tracing::trace!(
                scope = %key.scope,
                binding = key.binding,
                combination = %combination,
                progress = attempt.progress,
                "Sequence advanced"
            );
        }

        if attempt.progress == 0 {
            self.attempts.remove(key);
        } else {
            self.attempts.insert(key.clone(), attempt);
        }
        outcome
    }

    /// Drop all sequence attempts belonging to a scope.
    pub fn forget_scope(&mut self, scope: &ScopeId) {
        self.attempts.retain(|key, _| key.scope != *scope);
    }

    /// Clear held keys and every sequence attempt.
    pub fn reset(&mut self) {
        self.held.clear();
        self.released_chord.clear();
        self.attempts.clear();
        self.last_event_at = None;
    }
}

fn fires_on(trigger: TriggerOn, kind: KeyEventKind) -> bool {
    matches!(
        (trigger, kind),
        (TriggerOn::KeyDown, KeyEventKind::Down) | (TriggerOn::KeyUp, KeyEventKind::Up)
    )
}

fn waiting(progress: usize) -> StepOutcome {
    if progress > 0 {
        StepOutcome::Partial
    } else {
        StepOutcome::Failed {
            broke_sequence: false,
        }
    }
}

/// Whether the chord held at `input` satisfies `step`.
pub fn step_satisfied(step: &ChordStep, chord: &[HeldKey], input: &KeyInput) -> bool {
    let all_held = step
        .keys()
        .all(|k| chord.iter().any(|held| held.represents(k.as_str())));
    if !all_held {
        return false;
    }

    let triggered_by_step_key = step.keys().any(|k| input.represents(k.as_str()));
    if !triggered_by_step_key {
        return false;
    }

    let shift_allowed = step.has_shifted_symbol();
    chord
        .iter()
        .filter(|held| held.key.is_modifier())
        .all(|held| step.contains(held.key.as_str()) || (shift_allowed && held.key == KeyName::SHIFT))
}
