//! Declarative key-map documents.
//!
//! Responsibilities:
//! - Define the serialized form of a key-map document (options plus an
//!   ordered list of scopes).
//! - Validate scope structure and parse every key-map entry up front.
//! - Report combinations bound to more than one action in the same scope.
//!
//! Does NOT handle:
//! - Reading documents from disk (see `loader`).
//! - Registering scopes with a manager (see the core crate and CLI).
//!
//! Invariants:
//! - Scope order in the document is registration order; a parent must be
//!   declared before its children.
//! - Key-map entry order is preserved (`IndexMap`) because declaration order
//!   is the final specificity tie-break.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::options::OptionsSection;
use crate::combination::{Combination, KeySpec, ParseError, TriggerOn};

/// Errors found while validating a key-map document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Scope at position {index} has an empty id")]
    EmptyScopeId { index: usize },

    #[error("Scope '{id}' is declared more than once")]
    DuplicateScope { id: String },

    #[error("Scope '{id}' names parent '{parent}', which is not declared before it")]
    UnknownParent { id: String, parent: String },

    #[error("Invalid binding for action '{action}' in scope '{scope}': {source}")]
    InvalidBinding {
        scope: String,
        action: String,
        #[source]
        source: ParseError,
    },

    #[error("Scope '{scope}' lists a handler for '{action}', which has no key-map entry")]
    UnknownHandler { scope: String, action: String },
}

/// A key-map document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMapDocument {
    #[serde(default)]
    pub options: OptionsSection,
    #[serde(default)]
    pub scopes: Vec<ScopeDefinition>,
}

/// One scope as declared in a key-map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub global: bool,
    #[serde(default, alias = "keyMap")]
    pub key_map: IndexMap<String, KeySpec>,
    /// Actions that have a handler. `None` binds a handler for every action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handlers: Option<Vec<String>>,
}

/// A parsed key-map entry: one action and one of its alternative combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBinding {
    pub action: String,
    pub combination: Combination,
}

/// Two actions in one scope that share a combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConflict {
    pub scope: String,
    pub combination: String,
    pub first_action: String,
    pub second_action: String,
}

impl ScopeDefinition {
    /// Parse every entry in declaration order, expanding alternatives.
    pub fn parse_bindings(&self) -> Result<Vec<ParsedBinding>, DocumentError> {
        let mut bindings = Vec::new();
        for (action, spec) in &self.key_map {
            let combos = spec
                .parse()
                .map_err(|source| DocumentError::InvalidBinding {
                    scope: self.id.clone(),
                    action: action.clone(),
                    source,
                })?;
            bindings.extend(combos.into_iter().map(|combination| ParsedBinding {
                action: action.clone(),
                combination,
            }));
        }
        Ok(bindings)
    }

    /// Actions that should receive a handler.
    pub fn handled_actions(&self) -> Vec<&str> {
        match &self.handlers {
            Some(list) => list.iter().map(String::as_str).collect(),
            None => self.key_map.keys().map(String::as_str).collect(),
        }
    }
}

impl KeyMapDocument {
    /// Validate scope structure and parse all bindings.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (index, scope) in self.scopes.iter().enumerate() {
            if scope.id.trim().is_empty() {
                return Err(DocumentError::EmptyScopeId { index });
            }
            if let Some(parent) = &scope.parent
                && !seen.contains(parent.as_str())
            {
                return Err(DocumentError::UnknownParent {
                    id: scope.id.clone(),
                    parent: parent.clone(),
                });
            }
            if !seen.insert(scope.id.as_str()) {
                return Err(DocumentError::DuplicateScope {
                    id: scope.id.clone(),
                });
            }

            scope.parse_bindings()?;

            if let Some(handlers) = &scope.handlers
                && let Some(action) = handlers.iter().find(|a| !scope.key_map.contains_key(*a))
            {
                return Err(DocumentError::UnknownHandler {
                    scope: scope.id.clone(),
                    action: action.clone(),
                });
            }
        }
        Ok(())
    }

    /// Find combinations assigned to more than one action within a scope.
    ///
    /// These are legal; the earlier declaration wins at dispatch time.
    pub fn find_conflicts(&self) -> Vec<BindingConflict> {
        let mut conflicts = Vec::new();
        for scope in &self.scopes {
            let Ok(bindings) = scope.parse_bindings() else {
                continue;
            };
            let mut owner: HashMap<(String, TriggerOn), &str> = HashMap::new();
            for binding in &bindings {
                let key = (binding.combination.to_string(), binding.combination.trigger());
                match owner.get(&key) {
                    Some(first) if *first != binding.action => {
                        conflicts.push(BindingConflict {
                            scope: scope.id.clone(),
                            combination: key.0.clone(),
                            first_action: first.to_string(),
                            second_action: binding.action.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        owner.insert(key, binding.action.as_str());
                    }
                }
            }
        }
        conflicts
    }

    pub fn scope(&self, id: &str) -> Option<&ScopeDefinition> {
        self.scopes.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(json: &str) -> KeyMapDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_document_preserves_key_map_order() {
        let doc = document(
            r#"{"scopes": [{"id": "editor", "key_map": {"save": "ctrl+s", "close": "ctrl+w", "again": ["ctrl+y", "ctrl+shift+z"]}}]}"#,
        );
        let bindings = doc.scopes[0].parse_bindings().unwrap();
        let actions: Vec<&str> = bindings.iter().map(|b| b.action.as_str()).collect();
        assert_eq!(actions, vec!["save", "close", "again", "again"]);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_camel_case_key_map_alias() {
        let doc = document(r#"{"scopes": [{"id": "a", "global": true, "keyMap": {"x": "x"}}]}"#);
        assert!(doc.scopes[0].global);
        assert_eq!(doc.scopes[0].key_map.len(), 1);
    }

    #[test]
    fn test_validate_duplicate_scope() {
        let doc = document(r#"{"scopes": [{"id": "a"}, {"id": "a"}]}"#);
        assert_eq!(
            doc.validate(),
            Err(DocumentError::DuplicateScope { id: "a".into() })
        );
    }

    #[test]
    fn test_validate_parent_must_come_first() {
        let doc = document(r#"{"scopes": [{"id": "child", "parent": "root"}, {"id": "root"}]}"#);
        assert!(matches!(
            doc.validate(),
            Err(DocumentError::UnknownParent { .. })
        ));
    }

    #[test]
    fn test_validate_empty_id() {
        let doc = document(r#"{"scopes": [{"id": "  "}]}"#);
        assert_eq!(doc.validate(), Err(DocumentError::EmptyScopeId { index: 0 }));
    }

    #[test]
    fn test_validate_invalid_binding() {
        let doc = document(r#"{"scopes": [{"id": "a", "key_map": {"bad": "ctrl+nope"}}]}"#);
        let err = doc.validate().unwrap_err();
        assert!(matches!(err, DocumentError::InvalidBinding { ref action, .. } if action == "bad"));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_validate_unknown_handler() {
        let doc = document(
            r#"{"scopes": [{"id": "a", "key_map": {"one": "a"}, "handlers": ["two"]}]}"#,
        );
        assert!(matches!(
            doc.validate(),
            Err(DocumentError::UnknownHandler { .. })
        ));
    }

    #[test]
    fn test_handled_actions_default_to_all() {
        let doc = document(
            r#"{"scopes": [{"id": "a", "key_map": {"A": "a", "B": "b"}}, {"id": "b", "key_map": {"A": "a", "B": "b"}, "handlers": ["A"]}]}"#,
        );
        assert_eq!(doc.scopes[0].handled_actions(), vec!["A", "B"]);
        assert_eq!(doc.scopes[1].handled_actions(), vec!["A"]);
    }

    #[test]
    fn test_find_conflicts() {
        let doc = document(
            r#"{"scopes": [{"id": "a", "key_map": {"save": "ctrl+s", "store": "Control + s", "other": {"sequence": "ctrl+s", "action": "keyup"}}}]}"#,
        );
        let conflicts = doc.find_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].first_action, "save");
        assert_eq!(conflicts[0].second_action, "store");
        assert_eq!(conflicts[0].combination, "ctrl+s");
    }

    #[test]
    fn test_yaml_document() {
        let yaml = "options:\n  sequence_timeout_ms: 400\nscopes:\n  - id: app\n    global: true\n    key_map:\n      help: \"?\"\n      top: g g\n";
        let doc: KeyMapDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc.options.sequence_timeout_ms, Some(400));
        assert!(doc.validate().is_ok());
        assert_eq!(doc.scope("app").unwrap().parse_bindings().unwrap().len(), 2);
    }
}
