//! Dial-status carry-over store (§4.10): holds the last `dialstatus` for
//! a caller so it can be attached to that caller's eventual hangup event.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::event::DialEnvelope;

/// Keyed by caller `uniqueid`. Insert-replace on arrival, find-and-remove
/// on hangup lookup. No eviction beyond consumption: orphan entries
/// (caller never hangs up within this process) are acceptable leakage,
/// per `spec.md` §4.10.
#[derive(Debug, Default)]
pub struct DialStatusStore {
    entries: Mutex<HashMap<String, DialEnvelope>>,
}

impl DialStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `envelope` under `caller_uniqueid`, replacing any prior
    /// entry for that caller.
    pub fn store(&self, caller_uniqueid: &str, envelope: DialEnvelope) {
        self.entries
            .lock()
            .unwrap()
            .insert(caller_uniqueid.to_string(), envelope);
    }

    /// Removes and returns the entry for `caller_uniqueid`, if any. This
    /// is the consuming lookup the hangup rule in §4.2 performs.
    pub fn take(&self, caller_uniqueid: &str) -> Option<DialEnvelope> {
        self.entries.lock().unwrap().remove(caller_uniqueid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ChannelSnapshot;

    fn envelope(dialstatus: &str) -> DialEnvelope {
        DialEnvelope {
            caller: ChannelSnapshot::default(),
            forward: String::new(),
            dialstatus: dialstatus.to_string(),
        }
    }

    #[test]
    fn store_then_take_consumes_entry() {
        let store = DialStatusStore::new();
        store.store("u1", envelope("BUSY"));
        let taken = store.take("u1").unwrap();
        assert_eq!(taken.dialstatus, "BUSY");
        assert!(store.take("u1").is_none());
    }

    #[test]
    fn later_store_replaces_earlier_one() {
        let store = DialStatusStore::new();
        store.store("u1", envelope("NOANSWER"));
        store.store("u1", envelope("BUSY"));
        assert_eq!(store.take("u1").unwrap().dialstatus, "BUSY");
    }

    #[test]
    fn take_on_absent_caller_is_none() {
        let store = DialStatusStore::new();
        assert!(store.take("nope").is_none());
    }
}
