//! Session runtime — per-connection state, handler registry, render/dispatch.
//!
//! One session is owned by exactly one connection and driven strictly
//! sequentially: render, wait for an event, dispatch, render again. The
//! builder and every widget helper receive the session as an explicit
//! `&mut` parameter, which statically rules out reentrant renders and
//! removes any ambient "current session" state to restore on unwind.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::kv::KvStore;
use crate::node::Node;

/// Event callback bound to one (node identity, event name) pair.
pub type Handler = Box<dyn FnMut(&mut Session, Value) + Send>;

/// Application-supplied UI builder: a pure function of session state
/// producing a full tree.
pub type Builder = Arc<dyn Fn(&mut Session) -> Node + Send + Sync>;

/// Per-connection state and handler registry.
pub struct Session {
    pub id: String,
    /// The only state that persists across renders within one connection.
    pub vars: HashMap<String, Value>,
    /// Loaded once at creation; env plus optional override file.
    pub secrets: HashMap<String, String>,
    /// File-backed store shared across sessions at file granularity.
    pub store: KvStore,
    handlers: HashMap<(String, String), Handler>,
    builder: Builder,
}

impl Session {
    pub fn new(builder: Builder, secrets: HashMap<String, String>, store: KvStore) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            vars: HashMap::new(),
            secrets,
            store,
            handlers: HashMap::new(),
            builder,
        }
    }

    pub fn var(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: Value) {
        self.vars.insert(key.into(), value);
    }

    /// Build a fresh tree for the current state.
    ///
    /// The handler registry is cleared first: registrations are keyed by the
    /// node identities of the tree being built, so entries from an earlier
    /// render can never match and would only accumulate.
    pub fn render(&mut self) -> Node {
        self.handlers.clear();
        let builder = Arc::clone(&self.builder);
        (builder)(self)
    }

    /// Bind `handler` to the exact (node, event) pair. The last registration
    /// within a render wins.
    pub fn register_handler(
        &mut self,
        node_id: impl Into<String>,
        event: impl Into<String>,
        handler: impl FnMut(&mut Session, Value) + Send + 'static,
    ) {
        self.handlers
            .insert((node_id.into(), event.into()), Box::new(handler));
    }

    /// Invoke the handler registered for the exact (node, event) pair.
    ///
    /// Returns whether a handler ran. An unknown pair is a silent no-op: the
    /// client may race and report an event against an identity that no longer
    /// exists. Dispatch never re-renders; that is the connection loop's job.
    pub fn dispatch(&mut self, node_id: &str, event: &str, value: Value) -> bool {
        let key = (node_id.to_string(), event.to_string());
        // Detach the registry so the handler can borrow the session mutably.
        let mut handlers = std::mem::take(&mut self.handlers);
        let hit = match handlers.get_mut(&key) {
            Some(handler) => {
                handler(self, value);
                true
            }
            None => {
                debug!(session = %self.id, node_id, event, "No handler for event");
                false
            }
        };
        // Keep any registrations the handler made while the registry was
        // detached; they override the detached entries.
        for (k, h) in handlers {
            self.handlers.entry(k).or_insert(h);
        }
        hit
    }

    /// Number of currently registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}
