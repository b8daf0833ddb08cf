//! Pickup and local-channel-optimization correlators (§4.7).

use serde_json::json;

use crate::engine::CelEngine;
use crate::event::CelEventType;
use crate::snapshot::ChannelSnapshot;

pub fn handle_pickup(engine: &CelEngine, channel: ChannelSnapshot, target: ChannelSnapshot) {
    let extra = json!({ "pickup_channel": channel.name });
    engine.report_candidate(CelEventType::Pickup, &target, "", Some(&extra));
}

/// Local optimization only ever carries `two`'s name; `one` is already
/// the attributed channel and is not duplicated into `extra`. The
/// original engine's handler behaves the same way — see DESIGN.md for
/// the open question this resolves ("left as-is").
pub fn handle_local_optimize(engine: &CelEngine, one: ChannelSnapshot, two: ChannelSnapshot) {
    let extra = json!({ "local_two": two.name });
    engine.report_candidate(CelEventType::LocalOptimize, &one, "", Some(&extra));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CelConfig;
    use crate::record::SystemClock;
    use std::sync::{Arc, Mutex};

    fn engine() -> (CelEngine, Arc<Mutex<Vec<(CelEventType, serde_json::Value)>>>) {
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
            .register_backend(
                "c",
                Arc::new(move |record| {
                    r.lock().unwrap().push((
                        record.event_type,
                        serde_json::from_str(&record.extra).unwrap_or_default(),
                    ))
                }),
            )
            .unwrap();
        (engine, received)
    }

    #[test]
    fn pickup_attributed_to_target_with_picker_name() {
        let (engine, received) = engine();
        let channel = ChannelSnapshot {
            name: "SIP/picker-1".into(),
            ..Default::default()
        };
        let target = ChannelSnapshot {
            name: "SIP/picked-1".into(),
            ..Default::default()
        };
        handle_pickup(&engine, channel, target);
        let (event_type, extra) = received.lock().unwrap()[0].clone();
        assert_eq!(event_type, CelEventType::Pickup);
        assert_eq!(extra["pickup_channel"], "SIP/picker-1");
    }

    #[test]
    fn local_optimize_carries_only_channel_two_name() {
        let (engine, received) = engine();
        let one = ChannelSnapshot {
            name: "Local/one-1".into(),
            ..Default::default()
        };
        let two = ChannelSnapshot {
            name: "Local/two-1".into(),
            ..Default::default()
        };
        handle_local_optimize(&engine, one, two);
        let (event_type, extra) = received.lock().unwrap()[0].clone();
        assert_eq!(event_type, CelEventType::LocalOptimize);
        assert_eq!(extra["local_two"], "Local/two-1");
        assert_eq!(extra.as_object().unwrap().len(), 1);
    }
}
