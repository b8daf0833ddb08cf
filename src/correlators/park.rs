//! Parking correlator (§4.6): one dispatch per parked-call message.

use serde_json::json;

use crate::engine::CelEngine;
use crate::event::{CelEventType, ParkEventKind};
use crate::snapshot::ChannelSnapshot;

pub fn handle(
    engine: &CelEngine,
    kind: ParkEventKind,
    parkee: ChannelSnapshot,
    parker_dial_string: String,
    parking_lot: String,
) {
    match kind {
        ParkEventKind::Started => {
            let extra = json!({
                "parker_dial_string": parker_dial_string,
                "parking_lot": parking_lot,
            });
            engine.report_candidate(CelEventType::ParkStart, &parkee, "", Some(&extra));
        }
        ParkEventKind::Ended(reason) => {
            let extra = json!({ "reason": reason.to_string() });
            engine.report_candidate(CelEventType::ParkEnd, &parkee, "", Some(&extra));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CelConfig;
    use crate::event::ParkEndReason;
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
    fn parked_call_starts_a_park() {
        let (engine, received) = engine();
        handle(
            &engine,
            ParkEventKind::Started,
            ChannelSnapshot::default(),
            "SIP/1000".into(),
            "default".into(),
        );
        let (event_type, extra) = received.lock().unwrap()[0].clone();
        assert_eq!(event_type, CelEventType::ParkStart);
        assert_eq!(extra["parker_dial_string"], "SIP/1000");
        assert_eq!(extra["parking_lot"], "default");
    }

    #[test]
    fn timeout_ends_a_park_with_literal_reason_string() {
        let (engine, received) = engine();
        handle(
            &engine,
            ParkEventKind::Ended(ParkEndReason::TimeOut),
            ChannelSnapshot::default(),
            String::new(),
            String::new(),
        );
        let (event_type, extra) = received.lock().unwrap()[0].clone();
        assert_eq!(event_type, CelEventType::ParkEnd);
        assert_eq!(extra["reason"], "ParkedCallTimeOut");
    }
}
