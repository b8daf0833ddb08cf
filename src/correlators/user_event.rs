//! Generic user-event correlator (§4.8): a thin envelope around whatever
//! CEL event a host module wants to inject directly.

use serde_json::Value;
use tracing::error;

use crate::engine::CelEngine;
use crate::event::CelEventType;
use crate::snapshot::ChannelSnapshot;

pub fn handle(engine: &CelEngine, event_type: i64, channel: ChannelSnapshot, event: String, extra: Value) {
    if event_type != CelEventType::UserDefined.code() as i64 {
        error!(event_type, "unhandled generic CEL event subtype");
        return;
    }
    engine.report_candidate(CelEventType::UserDefined, &channel, &event, Some(&extra));
}
