//! Bridge enter/leave correlator (§4.3).

use serde_json::json;

use crate::engine::CelEngine;
use crate::event::CelEventType;
use crate::snapshot::ChannelSnapshot;

pub fn handle_enter(engine: &CelEngine, bridge_uniqueid: String, channel: ChannelSnapshot) {
    if channel.is_internal() {
        return;
    }
    let extra = json!({ "bridge_id": bridge_uniqueid });
    engine.report_candidate(CelEventType::BridgeEnter, &channel, "", Some(&extra));
}

pub fn handle_leave(engine: &CelEngine, bridge_uniqueid: String, channel: ChannelSnapshot) {
    if channel.is_internal() {
        return;
    }
    let extra = json!({ "bridge_id": bridge_uniqueid });
    engine.report_candidate(CelEventType::BridgeExit, &channel, "", Some(&extra));
}
