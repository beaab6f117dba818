//! Scope registry.
//!
//! Responsibilities:
//! - Own every registered scope (key map, handlers, tree links) in an arena
//!   addressed by `ScopeId`.
//! - Track global scopes in registration order and the single focused scope.
//! - Compute the order in which scopes are consulted for an event.
//!
//! Does NOT handle:
//! - Key state or sequence progress (see `state`).
//! - Choosing a binding within a scope (see `matcher`).
//!
//! Invariants:
//! - Scopes form a strict tree; removing a scope removes its whole subtree.
//! - `globals` only holds ids of registered global scopes.
//! - `focused`, when set, names a registered scope.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use hotkeys_config::{Combination, KeyName, KeySpec, ScopeDefinition};

use crate::error::{HotkeysError, Result};
use crate::metrics::DispatchTier;

/// Identity of a registered scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ScopeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ScopeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One action bound to one combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBinding {
    pub action: String,
    pub combination: Combination,
}

/// Ordered action bindings for a scope.
///
/// An action with alternative combinations appears once per alternative.
/// Declaration order is the last specificity tie-break.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<ActionBinding>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `action` to one or more combinations.
    ///
    /// ```
    /// use hotkeys_core::KeyMap;
    ///
    /// let key_map = KeyMap::new()
    ///     .bind("save", "ctrl+s")?
    ///     .bind("down", ["j", "down"])?;
    /// assert_eq!(key_map.len(), 3);
    /// # Ok::<(), hotkeys_core::HotkeysError>(())
    /// ```
    pub fn bind(mut self, action: impl Into<String>, spec: impl Into<KeySpec>) -> Result<Self> {
        let action = action.into();
        for combination in spec.into().parse()? {
            self.bindings.push(ActionBinding {
                action: action.clone(),
                combination,
            });
        }
        Ok(self)
    }

    /// Build a key map from a key-map document scope.
    pub fn from_definition(definition: &ScopeDefinition) -> Result<Self> {
        let bindings = definition
            .parse_bindings()?
            .into_iter()
            .map(|parsed| ActionBinding {
                action: parsed.action,
                combination: parsed.combination,
            })
            .collect();
        Ok(Self { bindings })
    }

    pub fn bindings(&self) -> &[ActionBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// What a handler is told about the event that triggered it.
#[derive(Debug, Clone, Copy)]
pub struct HotkeyEvent<'a> {
    pub scope: &'a ScopeId,
    pub action: &'a str,
    pub combination: &'a Combination,
    pub key: &'a KeyName,
}

pub type Handler = Box<dyn FnMut(&HotkeyEvent<'_>)>;

/// Handlers for a scope, keyed by action name.
#[derive(Default)]
pub struct Handlers {
    map: HashMap<String, Handler>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler for `action`, replacing any previous one.
    pub fn on(mut self, action: impl Into<String>, handler: impl FnMut(&HotkeyEvent<'_>) + 'static) -> Self {
        self.map.insert(action.into(), Box::new(handler));
        self
    }

    pub fn insert(&mut self, action: impl Into<String>, handler: Handler) {
        self.map.insert(action.into(), handler);
    }

    pub fn contains(&self, action: &str) -> bool {
        self.map.contains_key(action)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Invoke the handler for `event.action`. Returns false if none is bound.
    pub(crate) fn invoke(&mut self, event: &HotkeyEvent<'_>) -> bool {
        match self.map.get_mut(event.action) {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&String> = self.map.keys().collect();
        actions.sort();
        f.debug_struct("Handlers").field("actions", &actions).finish()
    }
}

/// A registered scope.
#[derive(Debug)]
pub struct Scope {
    pub(crate) id: ScopeId,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    pub(crate) key_map: KeyMap,
    pub(crate) handlers: Handlers,
    pub(crate) is_global: bool,
}

impl Scope {
    pub fn id(&self) -> &ScopeId {
        &self.id
    }

    pub fn parent(&self) -> Option<&ScopeId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn is_global(&self) -> bool {
        self.is_global
    }

    pub fn has_handler(&self, action: &str) -> bool {
        self.handlers.contains(action)
    }
}

/// Arena of registered scopes plus the focus pointer.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: HashMap<ScopeId, Scope>,
    roots: Vec<ScopeId>,
    globals: Vec<ScopeId>,
    focused: Option<ScopeId>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope under `parent` (or as a root).
    pub fn register(
        &mut self,
        parent: Option<&str>,
        id: ScopeId,
        key_map: KeyMap,
        handlers: Handlers,
        is_global: bool,
    ) -> Result<()> {
        if self.scopes.contains_key(&id) {
            tracing::error!(scope = %id, "Scope registered twice");
            return Err(HotkeysError::DuplicateScope { id: id.0 });
        }

        let parent = match parent {
            Some(parent) => {
                let parent_scope =
                    self.scopes
                        .get_mut(parent)
                        .ok_or_else(|| HotkeysError::UnknownScope {
                            id: parent.to_string(),
                        })?;
                parent_scope.children.push(id.clone());
                Some(parent_scope.id.clone())
            }
            None => {
                self.roots.push(id.clone());
                None
            }
        };

        if is_global {
            self.globals.push(id.clone());
        }

        tracing::debug!(
            scope = %id,
            parent = ?parent.as_ref().map(ScopeId::as_str),
            global = is_global,
            bindings = key_map.len(),
            "Registered scope"
        );

        self.scopes.insert(
            id.clone(),
            Scope {
                id,
                parent,
                children: Vec::new(),
                key_map,
                handlers,
                is_global,
            },
        );
        Ok(())
    }

    /// Remove a scope and its subtree. Returns the removed ids, parents first;
    /// empty if `id` was not registered.
    pub fn deregister(&mut self, id: &str) -> Vec<ScopeId> {
        let Some(scope) = self.scopes.get(id) else {
            tracing::warn!(scope = %id, "Deregistering unknown scope");
            return Vec::new();
        };

        match scope.parent.clone() {
            Some(parent) => {
                if let Some(parent_scope) = self.scopes.get_mut(&parent) {
                    parent_scope.children.retain(|child| child.as_str() != id);
                }
            }
            None => self.roots.retain(|root| root.as_str() != id),
        }

        let mut removed = Vec::new();
        let mut pending = vec![ScopeId::from(id)];
        while let Some(next) = pending.pop() {
            if let Some(scope) = self.scopes.remove(&next) {
                pending.extend(scope.children.iter().rev().cloned());
                removed.push(scope.id);
            }
        }

        self.globals.retain(|g| !removed.contains(g));
        if let Some(focused) = &self.focused
            && removed.contains(focused)
        {
            tracing::debug!(scope = %focused, "Focused scope removed; clearing focus");
            self.focused = None;
        }

        tracing::debug!(scope = %id, removed = removed.len(), "Deregistered scope");
        removed
    }

    /// Replace a scope's key map and handlers.
    pub fn update(&mut self, id: &str, key_map: KeyMap, handlers: Handlers) -> Result<()> {
        let scope = self
            .scopes
            .get_mut(id)
            .ok_or_else(|| HotkeysError::UnknownScope { id: id.to_string() })?;
        scope.key_map = key_map;
        scope.handlers = handlers;
        Ok(())
    }

    pub fn set_focused(&mut self, id: &str) -> Result<()> {
        let scope = self
            .scopes
            .get(id)
            .ok_or_else(|| HotkeysError::UnknownScope { id: id.to_string() })?;
        self.focused = Some(scope.id.clone());
        Ok(())
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    pub fn focused(&self) -> Option<&ScopeId> {
        self.focused.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Scope> {
        self.scopes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scopes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Global scopes in registration order.
    pub fn globals(&self) -> &[ScopeId] {
        &self.globals
    }

    /// Root scopes in registration order.
    pub fn roots(&self) -> &[ScopeId] {
        &self.roots
    }

    /// Non-global scopes from the focused scope up to its root, innermost first.
    pub fn focus_path(&self) -> Vec<&ScopeId> {
        let mut path = Vec::new();
        let mut cursor = self.focused.as_ref();
        while let Some(id) = cursor {
            let Some(scope) = self.scopes.get(id) else {
                break;
            };
            if !scope.is_global {
                path.push(&scope.id);
            }
            cursor = scope.parent.as_ref();
        }
        path
    }

    /// Scopes to consult for an event: the focus path, then every global scope.
    pub fn dispatch_order(&self) -> Vec<(ScopeId, DispatchTier)> {
        let mut order: Vec<(ScopeId, DispatchTier)> = self
            .focus_path()
            .into_iter()
            .map(|id| (id.clone(), DispatchTier::Focus))
            .collect();
        order.extend(
            self.globals
                .iter()
                .map(|id| (id.clone(), DispatchTier::Global)),
        );
        order
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
        self.roots.clear();
        self.globals.clear();
        self.focused = None;
    }
}
