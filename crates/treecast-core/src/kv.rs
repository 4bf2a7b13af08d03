//! Durable key-value store — one JSON object per file, rewritten wholesale.
//!
//! The backing file is loaded lazily on first access and flushed after every
//! mutation via write-temp-then-rename, so readers always observe either the
//! previous complete state or the new one, never a partial write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::warn;

use crate::error::Result;

/// File-backed key-value map.
///
/// Load faults (missing file, unreadable file, corrupt JSON) degrade to an
/// empty map: availability over durability. Flush faults surface as `Err`
/// from `set`/`delete` so the host decides whether to log, retry, or abort;
/// the in-memory mutation is applied either way.
///
/// Concurrent stores over the same path race at file granularity — last
/// flush wins. Accepted for a single-process deployment.
pub struct KvStore {
    path: PathBuf,
    // None until first access.
    state: Mutex<Option<HashMap<String, Value>>>,
}

impl KvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut guard = self.lock();
        let map = Self::loaded(&mut guard, &self.path);
        map.get(key).cloned()
    }

    /// Stored value for `key`, or `default`.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Insert or replace `key`, then flush.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Result<()> {
        let mut guard = self.lock();
        let map = Self::loaded(&mut guard, &self.path);
        map.insert(key.into(), value);
        Self::flush(&self.path, map)
    }

    /// Remove `key` if present, then flush. A missing key is a no-op.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut guard = self.lock();
        let map = Self::loaded(&mut guard, &self.path);
        if map.remove(key).is_none() {
            return Ok(());
        }
        Self::flush(&self.path, map)
    }

    /// A copy of the full map.
    pub fn all(&self) -> HashMap<String, Value> {
        let mut guard = self.lock();
        Self::loaded(&mut guard, &self.path).clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<HashMap<String, Value>>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn loaded<'a>(
        guard: &'a mut MutexGuard<'_, Option<HashMap<String, Value>>>,
        path: &Path,
    ) -> &'a mut HashMap<String, Value> {
        guard.get_or_insert_with(|| Self::load(path))
    }

    fn load(path: &Path) -> HashMap<String, Value> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), %e, "Store file is not valid JSON, starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), %e, "Could not read store file, starting empty");
                HashMap::new()
            }
        }
    }

    /// Atomic write: serialize to a temp sibling, then rename over the target.
    fn flush(path: &Path, map: &HashMap<String, Value>) -> Result<()> {
        let data = serde_json::to_string(map)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, data.as_bytes())?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
