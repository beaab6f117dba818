//! Key event manager.
//!
//! Responsibilities:
//! - Own the scope registry, key state and options for one UI tree.
//! - Normalize raw events, apply the ignore condition and repeat rule.
//! - Feed the key state tracker, then the dispatch resolver.
//!
//! Does NOT handle:
//! - Receiving events from a platform (see the `crossterm` adapter or the CLI).
//! - Loading options or key-map documents (see `hotkeys-config`).
//!
//! Invariants:
//! - Key state is updated before any matcher sees the event, including for
//!   key-ups of ignored events so held keys never get stuck.
//! - Deregistering or updating a scope forgets its sequence attempts.
//! - An uppercase letter reported without modifier state holds shift until
//!   the letter is released.

use std::fmt;
use std::time::Instant;

use hotkeys_config::{HotkeysOptions, KeyMapDocument, KeyName};

use crate::dispatch::{self, Resolution};
use crate::error::Result;
use crate::event::{KeyEventKind, KeyInput, Modifiers, RawKeyEvent};
use crate::metrics::{IgnoreReason, record_event, record_ignored};
use crate::registry::{Handlers, KeyMap, ScopeId, ScopeRegistry};
use crate::state::KeyStateTracker;

/// Predicate deciding whether an event is ignored before matching.
pub type IgnoreCondition = Box<dyn Fn(&RawKeyEvent) -> bool>;

/// What the manager did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was dropped before matching.
    Ignored(IgnoreReason),
    Unmatched,
    /// A key sequence is in progress.
    Pending,
    /// An in-progress sequence was broken and nothing matched.
    Reset,
    /// A handler ran. `stop_propagation` tells the integration layer whether
    /// to stop the platform event from bubbling further.
    Handled {
        scope: ScopeId,
        action: String,
        stop_propagation: bool,
    },
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }
}

/// Registry, key state and options for one UI tree.
pub struct KeyEventManager {
    options: HotkeysOptions,
    registry: ScopeRegistry,
    tracker: KeyStateTracker,
    ignore_condition: Option<IgnoreCondition>,
    /// Shift was pressed on behalf of an uppercase letter.
    implied_shift: bool,
}

impl fmt::Debug for KeyEventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEventManager")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("tracker", &self.tracker)
            .field("custom_ignore_condition", &self.ignore_condition.is_some())
            .finish()
    }
}

impl Default for KeyEventManager {
    fn default() -> Self {
        Self::new(HotkeysOptions::default())
    }
}

impl KeyEventManager {
    pub fn new(options: HotkeysOptions) -> Self {
        let tracker = KeyStateTracker::new(options.sequence_timeout);
        Self {
            options,
            registry: ScopeRegistry::new(),
            tracker,
            ignore_condition: None,
            implied_shift: false,
        }
    }

    /// Register every scope of a key-map document, in document order.
    ///
    /// Handlers are not part of a document, so scopes start with `handlers`
    /// produced by `make_handlers` for each scope id.
    pub fn register_document(
        &mut self,
        document: &KeyMapDocument,
        mut make_handlers: impl FnMut(&str) -> Handlers,
    ) -> Result<()> {
        document.validate()?;
        for definition in &document.scopes {
            let key_map = KeyMap::from_definition(definition)?;
            self.register(
                definition.parent.as_deref(),
                definition.id.as_str(),
                key_map,
                make_handlers(&definition.id),
                definition.global,
            )?;
        }
        Ok(())
    }

    pub fn register(
        &mut self,
        parent: Option<&str>,
        id: impl Into<ScopeId>,
        key_map: KeyMap,
        handlers: Handlers,
        is_global: bool,
    ) -> Result<()> {
        self.registry
            .register(parent, id.into(), key_map, handlers, is_global)
    }

    /// Remove a scope and its subtree. Returns false if it was not registered.
    pub fn deregister(&mut self, id: &str) -> bool {
        let removed = self.registry.deregister(id);
        for scope in &removed {
            self.tracker.forget_scope(scope);
        }
        !removed.is_empty()
    }

    /// Replace a scope's key map and handlers. Its sequence attempts restart.
    pub fn update(&mut self, id: &str, key_map: KeyMap, handlers: Handlers) -> Result<()> {
        self.registry.update(id, key_map, handlers)?;
        self.tracker.forget_scope(&ScopeId::from(id));
        Ok(())
    }

    pub fn set_focused(&mut self, id: &str) -> Result<()> {
        self.registry.set_focused(id)?;
        tracing::debug!(scope = %id, "Focus changed");
        Ok(())
    }

    pub fn clear_focus(&mut self) {
        self.registry.clear_focus();
    }

    /// Replace the default target-based ignore rule with a custom predicate.
    pub fn set_ignore_events_condition(
        &mut self,
        condition: impl Fn(&RawKeyEvent) -> bool + 'static,
    ) {
        self.ignore_condition = Some(Box::new(condition));
    }

    /// Go back to the target-based ignore rule from the options.
    pub fn reset_ignore_events_condition(&mut self) {
        self.ignore_condition = None;
    }

    /// Drop every scope, the focus pointer and all key state.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.tracker.reset();
        self.implied_shift = false;
        tracing::debug!("Cleared key event manager");
    }

    pub fn options(&self) -> &HotkeysOptions {
        &self.options
    }

    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    pub fn key_state(&self) -> &KeyStateTracker {
        &self.tracker
    }

    pub fn focused(&self) -> Option<&ScopeId> {
        self.registry.focused()
    }

    /// Handle one event using the current time.
    pub fn handle_now(&mut self, event: &RawKeyEvent) -> DispatchOutcome {
        self.handle(event, Instant::now())
    }

    /// Handle one event delivered at `now`.
    pub fn handle(&mut self, event: &RawKeyEvent, now: Instant) -> DispatchOutcome {
        record_event(event.kind.as_str());

        let Some(key) = event.key_name() else {
            tracing::trace!(key = ?event.key, "Ignoring unbindable key");
            return self.ignored(IgnoreReason::UnknownKey);
        };

        if self.is_ignored(event) {
            if event.kind == KeyEventKind::Up {
                self.tracker.on_key_up(&key, now);
                self.release_implied_shift(event);
            }
            tracing::trace!(key = %key, "Ignoring event for its target");
            return self.ignored(IgnoreReason::Target);
        }

        if let Some(reported) = event.modifiers {
            self.tracker
                .sync_modifiers(reported, Modifiers::for_key(&key), now);
        }
        if event.modifiers.is_none()
            && event.kind == KeyEventKind::Down
            && event.implies_shift()
            && !self.tracker.is_down(KeyName::SHIFT.as_str())
        {
            self.tracker
                .on_key_down(KeyName::SHIFT, vec![KeyName::SHIFT], now);
            self.implied_shift = true;
        }

        let shift_held = self.tracker.is_down(KeyName::SHIFT.as_str());
        let input = KeyInput::new(key, shift_held, event.kind);
        match event.kind {
            KeyEventKind::Down => {
                let was_held =
                    self.tracker
                        .on_key_down(input.key.clone(), input.names.clone(), now);
                if self.options.ignore_repeated_events_when_key_held_down
                    && (event.repeat || was_held)
                {
                    tracing::trace!(key = %input.key, "Ignoring repeated key-down");
                    return self.ignored(IgnoreReason::Repeat);
                }
            }
            KeyEventKind::Up => {
                self.tracker.on_key_up(&input.key, now);
            }
        }

        let resolution = dispatch::dispatch(&mut self.registry, &mut self.tracker, &input, now);
        if event.kind == KeyEventKind::Up {
            self.release_implied_shift(event);
        }

        match resolution {
            Resolution::Handled { scope, action, .. } => DispatchOutcome::Handled {
                scope,
                action,
                stop_propagation: self.options.stop_event_propagation_after_handling,
            },
            Resolution::Pending => DispatchOutcome::Pending,
            Resolution::Reset => DispatchOutcome::Reset,
            Resolution::Unmatched => DispatchOutcome::Unmatched,
        }
    }

    fn is_ignored(&self, event: &RawKeyEvent) -> bool {
        if let Some(condition) = &self.ignore_condition {
            return condition(event);
        }
        let Some(target) = &event.target else {
            return false;
        };
        (target.editable && self.options.ignore_content_editable)
            || target
                .tag
                .as_deref()
                .is_some_and(|tag| self.options.ignores_tag(tag))
    }

    fn release_implied_shift(&mut self, released: &RawKeyEvent) {
        if self.implied_shift && released.implies_shift() {
            self.tracker.release(&KeyName::SHIFT);
            self.implied_shift = false;
        }
    }

    fn ignored(&self, reason: IgnoreReason) -> DispatchOutcome {
        record_ignored(reason);
        DispatchOutcome::Ignored(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTarget;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    fn counting(action: &str) -> (Handlers, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let handlers = Handlers::new().on(action, move |_| seen.set(seen.get() + 1));
        (handlers, count)
    }

    fn manager_with(action: &str, combination: &str) -> (KeyEventManager, Rc<Cell<u32>>) {
        let mut manager = KeyEventManager::default();
        let (handlers, count) = counting(action);
        let key_map = KeyMap::new().bind(action, combination).unwrap();
        manager.register(None, "app", key_map, handlers, true).unwrap();
        (manager, count)
    }

    fn tap(manager: &mut KeyEventManager, key: &str, now: Instant) -> DispatchOutcome {
        let outcome = manager.handle(&RawKeyEvent::down(key), now);
        manager.handle(&RawKeyEvent::up(key), now);
        outcome
    }

    #[test]
    fn test_handled_reports_propagation() {
        let (mut manager, count) = manager_with("save", "ctrl+s");
        let now = Instant::now();
        manager.handle(&RawKeyEvent::down("Control"), now);
        let outcome = manager.handle(
            &RawKeyEvent::down("s").with_modifiers(Modifiers::CTRL),
            now,
        );
        assert_eq!(
            outcome,
            DispatchOutcome::Handled {
                scope: "app".into(),
                action: "save".into(),
                stop_propagation: true,
            }
        );
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_reported_modifiers_without_key_down() {
        let (mut manager, count) = manager_with("save", "ctrl+s");
        let outcome = manager.handle(
            &RawKeyEvent::down("s").with_modifiers(Modifiers::CTRL),
            Instant::now(),
        );
        assert!(outcome.is_handled());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_modifier_key_down_with_its_own_flag_is_not_a_repeat() {
        let (mut manager, _) = manager_with("save", "ctrl+s");
        let outcome = manager.handle(
            &RawKeyEvent::down("Control").with_modifiers(Modifiers::CTRL),
            Instant::now(),
        );
        assert_eq!(outcome, DispatchOutcome::Unmatched);
    }

    #[test]
    fn test_uppercase_letter_without_modifiers_implies_shift() {
        let (mut manager, count) = manager_with("bottom", "G");
        let now = Instant::now();

        assert!(tap(&mut manager, "G", now).is_handled());
        assert_eq!(count.get(), 1);
        assert_eq!(manager.key_state().currently_down().count(), 0);

        // Lowercase still does not satisfy the shifted binding.
        assert_eq!(tap(&mut manager, "g", now), DispatchOutcome::Unmatched);
    }

    #[test]
    fn test_reported_modifiers_override_uppercase_inference() {
        let (mut manager, count) = manager_with("bottom", "G");
        let now = Instant::now();

        let outcome = manager.handle(
            &RawKeyEvent::down("G").with_modifiers(Modifiers::empty()),
            now,
        );
        assert_eq!(outcome, DispatchOutcome::Unmatched);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_implied_shift_keeps_real_shift_held() {
        let (mut manager, count) = manager_with("bottom", "G");
        let now = Instant::now();

        manager.handle(&RawKeyEvent::down("Shift"), now);
        assert!(tap(&mut manager, "G", now).is_handled());
        assert!(manager.key_state().is_down("shift"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_ignored_target() {
        let (mut manager, count) = manager_with("next", "n");
        let now = Instant::now();
        let event = RawKeyEvent::down("n").with_target(EventTarget::tag("INPUT"));
        assert_eq!(
            manager.handle(&event, now),
            DispatchOutcome::Ignored(IgnoreReason::Target)
        );
        let event = RawKeyEvent::down("n").with_target(EventTarget::editable());
        assert_eq!(
            manager.handle(&event, now),
            DispatchOutcome::Ignored(IgnoreReason::Target)
        );
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_ignored_key_up_still_releases_key() {
        let (mut manager, _) = manager_with("next", "n");
        let now = Instant::now();
        manager.handle(&RawKeyEvent::down("n"), now);
        manager.handle(
            &RawKeyEvent::up("n").with_target(EventTarget::tag("textarea")),
            now,
        );
        assert!(!manager.key_state().is_down("n"));
    }

    #[test]
    fn test_custom_ignore_condition() {
        let (mut manager, count) = manager_with("next", "n");
        let now = Instant::now();
        manager.set_ignore_events_condition(|_| false);
        let event = RawKeyEvent::down("n").with_target(EventTarget::tag("input"));
        assert!(manager.handle(&event, now).is_handled());
        manager.handle(&RawKeyEvent::up("n"), now);

        manager.set_ignore_events_condition(|event| event.repeat);
        assert_eq!(
            manager.handle(&RawKeyEvent::down("n").repeated(), now),
            DispatchOutcome::Ignored(IgnoreReason::Target)
        );
        manager.reset_ignore_events_condition();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_repeats_suppressed_while_held() {
        let (mut manager, count) = manager_with("next", "n");
        let now = Instant::now();
        manager.handle(&RawKeyEvent::down("n"), now);
        assert_eq!(
            manager.handle(&RawKeyEvent::down("n"), now),
            DispatchOutcome::Ignored(IgnoreReason::Repeat)
        );
        assert_eq!(
            manager.handle(&RawKeyEvent::down("n").repeated(), now),
            DispatchOutcome::Ignored(IgnoreReason::Repeat)
        );
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_repeats_dispatched_when_allowed() {
        let options = HotkeysOptions {
            ignore_repeated_events_when_key_held_down: false,
            ..HotkeysOptions::default()
        };
        let mut manager = KeyEventManager::new(options);
        let (handlers, count) = counting("next");
        let key_map = KeyMap::new().bind("next", "n").unwrap();
        manager.register(None, "app", key_map, handlers, true).unwrap();
        let now = Instant::now();
        manager.handle(&RawKeyEvent::down("n"), now);
        manager.handle(&RawKeyEvent::down("n").repeated(), now);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_unknown_key() {
        let mut manager = KeyEventManager::default();
        assert_eq!(
            manager.handle_now(&RawKeyEvent::down("Dead")),
            DispatchOutcome::Ignored(IgnoreReason::UnknownKey)
        );
    }

    #[test]
    fn test_deregister_forgets_attempts() {
        let (mut manager, count) = manager_with("seq", "a b");
        let now = Instant::now();
        assert_eq!(tap(&mut manager, "a", now), DispatchOutcome::Pending);
        assert!(manager.deregister("app"));
        assert!(!manager.deregister("app"));

        let (handlers, _) = counting("seq");
        let key_map = KeyMap::new().bind("seq", "a b").unwrap();
        manager.register(None, "app", key_map, handlers, true).unwrap();
        assert_eq!(tap(&mut manager, "b", now), DispatchOutcome::Unmatched);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_update_replaces_bindings() {
        let (mut manager, _) = manager_with("next", "n");
        let (handlers, count) = counting("next");
        manager
            .update("app", KeyMap::new().bind("next", "j").unwrap(), handlers)
            .unwrap();
        let now = Instant::now();
        assert_eq!(tap(&mut manager, "n", now), DispatchOutcome::Unmatched);
        assert!(tap(&mut manager, "j", now).is_handled());
        assert_eq!(count.get(), 1);
        assert!(manager.update("missing", KeyMap::new(), Handlers::new()).is_err());
    }

    #[test]
    fn test_timeout_from_options() {
        let options = HotkeysOptions {
            sequence_timeout: Duration::from_millis(200),
            ..HotkeysOptions::default()
        };
        let mut manager = KeyEventManager::new(options);
        let (handlers, count) = counting("seq");
        let key_map = KeyMap::new().bind("seq", "a b").unwrap();
        manager.register(None, "app", key_map, handlers, true).unwrap();
        let t0 = Instant::now();
        tap(&mut manager, "a", t0);
        tap(&mut manager, "b", t0 + Duration::from_millis(300));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_clear() {
        let (mut manager, _) = manager_with("next", "n");
        manager.handle(&RawKeyEvent::down("n"), Instant::now());
        manager.clear();
        assert!(manager.registry().is_empty());
        assert_eq!(manager.key_state().currently_down().count(), 0);
        assert!(manager.focused().is_none());
    }
}
