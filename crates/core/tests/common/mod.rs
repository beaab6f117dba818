//! Common test utilities for dispatch tests.
//!
//! This module provides a handler recorder, a virtual clock and helpers for
//! feeding key taps and chords into a `KeyEventManager`.
//!
//! # Invariants
//! - Time only moves when a test advances the clock.
//! - Recorded entries are `scope:action` strings in invocation order.

// Allow dead code since not all tests use all utilities
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub use hotkeys_core::{
    DispatchOutcome, EventTarget, Handlers, HotkeysOptions, IgnoreReason, KeyEventManager,
    KeyMap, Modifiers, RawKeyEvent,
};

/// Shared log of handler invocations.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers that record `scope:action` for each of `actions`.
    pub fn handlers(&self, scope: &str, actions: &[&str]) -> Handlers {
        actions.iter().fold(Handlers::new(), |handlers, action| {
            let log = Rc::clone(&self.0);
            let entry = format!("{scope}:{action}");
            handlers.on(*action, move |_| log.borrow_mut().push(entry.clone()))
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Manual clock for sequence timeout tests.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    now: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance_ms(&mut self, millis: u64) {
        self.now += Duration::from_millis(millis);
    }
}

/// Build a key map from `(action, entry)` pairs.
pub fn key_map(bindings: &[(&str, &str)]) -> KeyMap {
    bindings
        .iter()
        .fold(KeyMap::new(), |map, (action, entry)| {
            map.bind(*action, *entry).expect("valid key-map entry")
        })
}

/// Press and release one key.
pub fn tap(manager: &mut KeyEventManager, key: &str, clock: &Clock) -> DispatchOutcome {
    let outcome = manager.handle(&RawKeyEvent::down(key), clock.now());
    manager.handle(&RawKeyEvent::up(key), clock.now());
    outcome
}

/// Press every key in order, then release them in reverse. Returns the
/// outcome of the last key-down.
pub fn chord(manager: &mut KeyEventManager, keys: &[&str], clock: &Clock) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::Unmatched;
    for key in keys {
        outcome = manager.handle(&RawKeyEvent::down(*key), clock.now());
    }
    for key in keys.iter().rev() {
        manager.handle(&RawKeyEvent::up(*key), clock.now());
    }
    outcome
}
