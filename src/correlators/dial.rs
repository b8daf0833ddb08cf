//! Dial correlator (§4.5). `FORWARD` is emitted immediately; `dialstatus`
//! is only ever stored for the hangup rule in `channel_diff.rs` to
//! consume later.

use serde_json::json;

use crate::dialstatus::DialStatusStore;
use crate::engine::CelEngine;
use crate::event::{CelEventType, DialEnvelope};

pub fn handle(engine: &CelEngine, envelope: DialEnvelope) {
    if envelope.caller.is_internal() || envelope.caller.uniqueid.is_empty() {
        return;
    }

    if !envelope.forward.is_empty() {
        let extra = json!({ "forward": envelope.forward });
        engine.report_candidate(CelEventType::Forward, &envelope.caller, "", Some(&extra));
    }

    if !envelope.dialstatus.is_empty() {
        store_dialstatus(&engine.dial_status, &envelope);
    }
}

fn store_dialstatus(store: &DialStatusStore, envelope: &DialEnvelope) {
    store.store(&envelope.caller.uniqueid, envelope.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CelConfig;
    use crate::record::SystemClock;
    use crate::snapshot::ChannelSnapshot;
    use std::sync::{Arc, Mutex};

    fn engine() -> (CelEngine, Arc<Mutex<Vec<CelEventType>>>) {
        let mut mask = 0u64;
        for ev in CelEventType::ALL {
            mask |= ev.mask_bit();
        }
        let engine = CelEngine::with_clock(
            CelConfig {
                enable: true,
                dateformat: None,
                events_mask: mask,
                apps: Default::default(),
            },
            Box::new(SystemClock),
        );
        let received = Arc::new(Mutex::new(Vec::new()));
        let r = received.clone();
        engine
            .register_backend("c", Arc::new(move |record| r.lock().unwrap().push(record.event_type)))
            .unwrap();
        (engine, received)
    }

    #[test]
    fn forward_emits_immediately() {
        let (engine, received) = engine();
        handle(
            &engine,
            DialEnvelope {
                caller: ChannelSnapshot {
                    uniqueid: "1".into(),
                    ..Default::default()
                },
                forward: "SIP/200".into(),
                dialstatus: String::new(),
            },
        );
        assert_eq!(received.lock().unwrap().clone(), vec![CelEventType::Forward]);
    }

    #[test]
    fn dialstatus_is_stored_not_emitted() {
        let (engine, received) = engine();
        handle(
            &engine,
            DialEnvelope {
                caller: ChannelSnapshot {
                    uniqueid: "1".into(),
                    ..Default::default()
                },
                forward: String::new(),
                dialstatus: "BUSY".into(),
            },
        );
        assert!(received.lock().unwrap().is_empty());
        let stored = engine.dial_status.take("1").unwrap();
        assert_eq!(stored.dialstatus, "BUSY");
    }

    #[test]
    fn caller_without_uniqueid_is_dropped() {
        let (engine, received) = engine();
        handle(
            &engine,
            DialEnvelope {
                caller: ChannelSnapshot::default(),
                forward: "SIP/200".into(),
                dialstatus: String::new(),
            },
        );
        assert!(received.lock().unwrap().is_empty());
    }
}
