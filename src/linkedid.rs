//! Linked-call lifetime tracker (§4.9): emits `LINKEDID_END` exactly once
//! per logical call tree, when the last live channel sharing a linkedid
//! terminates.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{trace, warn};

use crate::error::{CelError, CelResult};

/// Refcount map re-expressing the original's `ao2`-backed bookkeeping as
/// a plain "count of live channels holding this linkedid" (per `spec.md`
/// §9 Design Notes, which explicitly sanctions this simplification over
/// literally porting the "refcount starts at 2, retires at 3" scheme).
#[derive(Debug, Default)]
pub struct LinkedIdTracker {
    counts: Mutex<HashMap<String, u32>>,
}

impl LinkedIdTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a reference for `linkedid`, creating the entry at count 1
    /// on first sight. Must never be called with an empty linkedid.
    pub fn acquire(&self, linkedid: &str) -> CelResult<()> {
        if linkedid.is_empty() {
            return Err(CelError::EmptyLinkedId);
        }
        let mut counts = self.counts.lock().unwrap();
        *counts.entry(linkedid.to_string()).or_insert(0) += 1;
        trace!(linkedid, "linkedid acquired");
        Ok(())
    }

    /// Decrements the refcount for `linkedid` and reports whether this
    /// call brought it to zero (i.e. whether `LINKEDID_END` should fire).
    /// The decrement-and-decide happens under one lock acquisition so a
    /// racing `acquire` cannot resurrect a retiring entry.
    ///
    /// No-op (returns `false`) if `linkedid` is empty or not tracked —
    /// the latter is logged as "weird" and tolerated, matching the
    /// original's handling of a missing entry at retirement time.
    pub fn release_and_check(&self, linkedid: &str) -> bool {
        if linkedid.is_empty() {
            return false;
        }
        let mut counts = self.counts.lock().unwrap();
        match counts.get_mut(linkedid) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    counts.remove(linkedid);
                    true
                } else {
                    false
                }
            }
            None => {
                let err = CelError::MissingLinkedId {
                    linkedid: linkedid.to_string(),
                };
                warn!(%err, "weird: retirement check found no tracked entry");
                false
            }
        }
    }

    /// Current refcount, for tests and diagnostics.
    pub fn count(&self, linkedid: &str) -> u32 {
        self.counts
            .lock()
            .unwrap()
            .get(linkedid)
            .copied()
            .unwrap_or(0)
    }
}
