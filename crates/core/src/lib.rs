//! Keyboard shortcut recognition and dispatch.
//!
//! This crate turns a stream of raw key-down and key-up events into action
//! names, routed through a tree of nested scopes to the handler owned by the
//! most specific relevant scope. Scopes on the focus path are consulted
//! innermost first, followed by global scopes in registration order.
//!
//! ```
//! use hotkeys_core::{Handlers, KeyEventManager, KeyMap, RawKeyEvent};
//!
//! let mut manager = KeyEventManager::default();
//! let key_map = KeyMap::new().bind("save", "ctrl+s")?;
//! let handlers = Handlers::new().on("save", |event| println!("{}", event.action));
//! manager.register(None, "editor", key_map, handlers, false)?;
//! manager.set_focused("editor")?;
//!
//! manager.handle_now(&RawKeyEvent::down("Control"));
//! assert!(manager.handle_now(&RawKeyEvent::down("s")).is_handled());
//! # Ok::<(), hotkeys_core::HotkeysError>(())
//! ```

pub mod dispatch;
pub mod error;
pub mod event;
pub mod manager;
pub mod matcher;
pub mod metrics;
pub mod registry;
pub mod state;
#[cfg(feature = "crossterm")]
pub mod terminal;

pub use dispatch::Resolution;
pub use error::{HotkeysError, Result};
pub use event::{EventTarget, KeyEventKind, KeyInput, Modifiers, RawKey, RawKeyEvent};
pub use manager::{DispatchOutcome, IgnoreCondition, KeyEventManager};
pub use matcher::{Candidate, MatchResult};
pub use metrics::{DispatchTier, IgnoreReason, ResetCause};
pub use registry::{ActionBinding, Handler, Handlers, HotkeyEvent, KeyMap, Scope, ScopeId, ScopeRegistry};
pub use state::{CombinationKey, KeyStateTracker, StepOutcome};
#[cfg(feature = "crossterm")]
pub use terminal::CrosstermAdapter;

pub use hotkeys_config::{
    Combination, HotkeysOptions, KeyMapDocument, KeyName, KeySpec, ParseError, TriggerOn,
};
