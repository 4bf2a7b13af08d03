//! Process-wide memoization cache with optional TTL.
//!
//! Two scopes with identical semantics: [`Scope::Data`] for computed values
//! and [`Scope::Resource`] for long-lived handles (loaded models, pooled
//! clients). The cache is an explicit object handed to call sites by
//! reference rather than a module-level singleton, so its lifecycle is
//! visible and tests stay isolated.
//!
//! Sessions do not scope the cache: two connections calling the same
//! memoized function with equal arguments observe each other's results.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

/// Which of the two cache maps an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Data,
    Resource,
}

struct Entry {
    inserted: Instant,
    value: Arc<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct MemoCache {
    data: Mutex<HashMap<String, Entry>>,
    resource: Mutex<HashMap<String, Entry>>,
    fallback_seq: AtomicU64,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a cache key from a function identity and its arguments.
    ///
    /// Arguments are canonicalized through serde_json. Key derivation fails
    /// open: unserializable arguments (e.g. non-finite floats) get a one-shot
    /// key so the call still succeeds, it just never hits the cache.
    pub fn key<A: Serialize>(&self, ident: &str, args: &A) -> String {
        match serde_json::to_string(args) {
            Ok(repr) => format!("{ident}({repr})"),
            Err(e) => {
                debug!(ident, %e, "Cache key fell back to identity");
                let n = self.fallback_seq.fetch_add(1, Ordering::Relaxed);
                format!("{ident}#uncacheable-{n}")
            }
        }
    }

    /// Return the cached value for `key`, or invoke `f`, cache its result,
    /// and return it.
    ///
    /// An entry is live when `ttl` is `None` or less time than `ttl` has
    /// elapsed since insertion. Expiry is lazy: a stale entry is removed only
    /// when it is next looked up. The lock is not held while `f` runs, so
    /// concurrent first calls with the same key may both execute `f`;
    /// memoized functions are expected to be idempotent.
    pub fn get_or_compute<T, F>(&self, scope: Scope, key: &str, ttl: Option<Duration>, f: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.lookup::<T>(scope, key, ttl) {
            return hit;
        }

        let value = f();
        let mut map = self.lock(scope);
        map.insert(
            key.to_string(),
            Entry {
                inserted: Instant::now(),
                value: Arc::new(value.clone()),
            },
        );
        value
    }

    /// Wipe one scope unconditionally.
    pub fn clear(&self, scope: Scope) {
        self.lock(scope).clear();
    }

    /// Wipe both scopes unconditionally.
    pub fn clear_all(&self) {
        self.clear(Scope::Data);
        self.clear(Scope::Resource);
    }

    fn lookup<T>(&self, scope: Scope, key: &str, ttl: Option<Duration>) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut map = self.lock(scope);
        let live = match map.get(key) {
            Some(entry) => ttl.is_none_or(|t| entry.inserted.elapsed() < t),
            None => return None,
        };
        if !live {
            map.remove(key);
            return None;
        }
        match map.get(key)?.value.clone().downcast::<T>() {
            Ok(v) => Some((*v).clone()),
            // Same key reused with a different type: treat as a miss and let
            // the caller overwrite it.
            Err(_) => None,
        }
    }

    fn lock(&self, scope: Scope) -> MutexGuard<'_, HashMap<String, Entry>> {
        let map = match scope {
            Scope::Data => &self.data,
            Scope::Resource => &self.resource,
        };
        map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
