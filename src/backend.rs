//! Backend registry and fan-out (§4.13).

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use tracing::{debug, error};

use crate::error::{CelError, CelResult};
use crate::event::CelEventRecord;

pub type BackendCallback = Arc<dyn Fn(&CelEventRecord) + Send + Sync>;

/// Name-keyed registry of backend callbacks. Uses `IndexMap` rather than
/// a plain `HashMap` so iteration order matches registration order —
/// deterministic for `cel show status` output and test assertions, where
/// the original's `ao2_callback` iteration order was hash-bucket order
/// and therefore not reproducible (see DESIGN.md REDESIGN note).
#[derive(Default)]
pub struct BackendRegistry {
    backends: Mutex<IndexMap<String, BackendCallback>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `name`. Rejects empty names and
    /// duplicate names.
    pub fn register(&self, name: &str, callback: BackendCallback) -> CelResult<()> {
        if name.is_empty() {
            return Err(CelError::BackendNameEmpty);
        }
        let mut backends = self.backends.lock().unwrap();
        if backends.contains_key(name) {
            return Err(CelError::DuplicateBackend {
                name: name.to_string(),
            });
        }
        backends.insert(name.to_string(), callback);
        debug!(name, "backend registered");
        Ok(())
    }

    /// Removes and drops the backend registered under `name`.
    pub fn unregister(&self, name: &str) -> CelResult<()> {
        let mut backends = self.backends.lock().unwrap();
        if backends.shift_remove(name).is_none() {
            return Err(CelError::UnknownBackend {
                name: name.to_string(),
            });
        }
        debug!(name, "backend unregistered");
        Ok(())
    }

    /// Names of all currently registered backends, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.backends.lock().unwrap().keys().cloned().collect()
    }

    /// Invokes every currently registered backend with `record`. Takes a
    /// snapshot of the entry set under the lock before invoking any
    /// callback, so a callback may itself call `register`/`unregister`
    /// without deadlocking (§5).
    pub fn fan_out(&self, record: &CelEventRecord) {
        let snapshot: Vec<(String, BackendCallback)> = self
            .backends
            .lock()
            .unwrap()
            .iter()
            .map(|(name, cb)| (name.clone(), cb.clone()))
            .collect();

        for (name, callback) in snapshot {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(record)));
            if result.is_err() {
                error!(name, "backend callback panicked; isolated from other backends");
            }
        }
    }
}
