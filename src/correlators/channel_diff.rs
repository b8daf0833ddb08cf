//! Channel-snapshot diff correlator (§4.2). The single busiest
//! correlator: application-change, state-change, and linkedid-change are
//! applied in that strict order, because application transitions must
//! reach backends before the hangup event, and linkedid bookkeeping runs
//! last so `CHANNEL_END` is emitted while the old linkedid still holds a
//! reference.

use serde_json::json;
use tracing::error;

use crate::engine::CelEngine;
use crate::event::CelEventType;
use crate::snapshot::ChannelSnapshot;

pub fn handle(engine: &CelEngine, old: Option<ChannelSnapshot>, new: Option<ChannelSnapshot>) {
    if old.as_ref().map(|s| s.is_internal()).unwrap_or(false)
        || new.as_ref().map(|s| s.is_internal()).unwrap_or(false)
    {
        return;
    }

    application_change(engine, old.as_ref(), new.as_ref());
    state_change(engine, old.as_ref(), new.as_ref());
    linkedid_change(engine, old.as_ref(), new.as_ref());
}

fn application_change(engine: &CelEngine, old: Option<&ChannelSnapshot>, new: Option<&ChannelSnapshot>) {
    if old.is_none() && new.is_none() {
        return;
    }
    let old_appl = old.map(|s| s.appl.as_str()).unwrap_or("");
    let new_appl = new.map(|s| s.appl.as_str()).unwrap_or("");
    if old_appl == new_appl {
        return;
    }
    if !old_appl.is_empty() {
        engine.report_candidate(CelEventType::AppEnd, old.unwrap(), "", None);
    }
    if !new_appl.is_empty() {
        engine.report_candidate(CelEventType::AppStart, new.unwrap(), "", None);
    }
}

fn state_change(engine: &CelEngine, old: Option<&ChannelSnapshot>, new: Option<&ChannelSnapshot>) {
    match (old, new) {
        (None, Some(new)) => {
            engine.report_candidate(CelEventType::ChannelStart, new, "", None);
        }
        (Some(old), None) => {
            engine.report_candidate(CelEventType::ChannelEnd, old, "", None);
            engine.linkedid_retirement_check(old);
        }
        (Some(old), Some(new)) => {
            if !old.is_dead() && new.is_dead() {
                let dialstatus = engine
                    .dial_status
                    .take(&new.uniqueid)
                    .map(|e| e.dialstatus)
                    .unwrap_or_default();
                let extra = json!({
                    "hangupcause": new.hangupcause,
                    "hangupsource": new.hangupsource,
                    "dialstatus": dialstatus,
                });
                engine.report_candidate(CelEventType::Hangup, new, "", Some(&extra));
            } else if old.state != new.state && new.state == Some(crate::snapshot::ChannelState::Up) {
                engine.report_candidate(CelEventType::Answer, new, "", None);
            }
        }
        (None, None) => {}
    }
}

fn linkedid_change(engine: &CelEngine, old: Option<&ChannelSnapshot>, new: Option<&ChannelSnapshot>) {
    let (Some(old), Some(new)) = (old, new) else {
        return;
    };
    if old.linkedid.is_empty() || new.linkedid.is_empty() {
        error!("linkedid change observed with an empty linkedid on one side");
        return;
    }
    if old.linkedid != new.linkedid {
        engine.linkedid_acquire_on_change(&new.linkedid);
        engine.linkedid_retirement_check(old);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CelConfig;
    use crate::record::{Clock, SystemClock};
    use crate::snapshot::ChannelState;
    use std::sync::{Arc, Mutex};

    fn all_events_config() -> CelConfig {
        let mut mask = 0u64;
        for ev in CelEventType::ALL {
            mask |= ev.mask_bit();
        }
        CelConfig {
            enable: true,
            dateformat: None,
            events_mask: mask,
            apps: Default::default(),
        }
    }

    fn engine_with_collector() -> (CelEngine, Arc<Mutex<Vec<CelEventType>>>) {
        let engine = CelEngine::with_clock(all_events_config(), Box::new(SystemClock));
        let received = Arc::new(Mutex::new(Vec::new()));
        let r = received.clone();
        engine
            .register_backend(
                "collector",
                Arc::new(move |record| r.lock().unwrap().push(record.event_type)),
            )
            .unwrap();
        (engine, received)
    }

    #[test]
    fn app_end_precedes_hangup_when_both_apply() {
        let (engine, received) = engine_with_collector();
        let mid = ChannelSnapshot {
            uniqueid: "1".into(),
            linkedid: "L".into(),
            appl: "Dial".into(),
            state: Some(ChannelState::Up),
            ..Default::default()
        };
        let dead = ChannelSnapshot {
            appl: String::new(),
            state: Some(ChannelState::Dead),
            ..mid.clone()
        };
        engine.dispatch(crate::event::UpstreamMessage::CacheUpdate {
            old: Some(mid),
            new: Some(dead),
        });
        let events = received.lock().unwrap().clone();
        let app_end_idx = events.iter().position(|e| *e == CelEventType::AppEnd).unwrap();
        let hangup_idx = events.iter().position(|e| *e == CelEventType::Hangup).unwrap();
        assert!(app_end_idx < hangup_idx);
    }

    #[test]
    fn equal_appl_including_both_empty_produces_no_app_event() {
        let (engine, received) = engine_with_collector();
        let a = ChannelSnapshot {
            uniqueid: "1".into(),
            linkedid: "L".into(),
            state: Some(ChannelState::Up),
            ..Default::default()
        };
        let b = ChannelSnapshot {
            state: Some(ChannelState::Up),
            ..a.clone()
        };
        engine.dispatch(crate::event::UpstreamMessage::CacheUpdate {
            old: Some(a),
            new: Some(b),
        });
        let events = received.lock().unwrap().clone();
        assert!(!events.contains(&CelEventType::AppStart));
        assert!(!events.contains(&CelEventType::AppEnd));
    }

    #[test]
    fn clock_is_object_safe_sanity() {
        let _: &dyn Clock = &SystemClock;
    }
}
