//! Blind and attended transfer correlator (§4.4).

use serde_json::json;

use crate::engine::CelEngine;
use crate::event::{AttendedTransfer, AttendedTransferDest, CelEventType};
use crate::snapshot::ChannelSnapshot;

pub fn handle_blind(
    engine: &CelEngine,
    result_is_success: bool,
    transferer: ChannelSnapshot,
    exten: String,
    context: String,
    bridge_uniqueid: String,
) {
    if !result_is_success || exten.is_empty() || context.is_empty() {
        return;
    }
    let extra = json!({
        "extension": exten,
        "context": context,
        "bridge_id": bridge_uniqueid,
    });
    engine.report_candidate(CelEventType::BlindTransfer, &transferer, "", Some(&extra));
}

pub fn handle_attended(engine: &CelEngine, transfer: AttendedTransfer) {
    if transfer.dest_type == AttendedTransferDest::Fail {
        return;
    }

    // Normalize so the primary leg (bridge1, channel1) is always the one
    // with a non-null bridge: swap transferee/target if to_transferee's
    // bridge is missing.
    let (primary, secondary) = if transfer.to_transferee.bridge_uniqueid.is_none() {
        (transfer.to_transfer_target, transfer.to_transferee)
    } else {
        (transfer.to_transferee, transfer.to_transfer_target)
    };

    let bridge1_id = primary.bridge_uniqueid.clone().unwrap_or_default();
    let extra = match transfer.dest_type {
        AttendedTransferDest::BridgeMerge | AttendedTransferDest::Link | AttendedTransferDest::ThreeWay => json!({
            "bridge1_id": bridge1_id,
            "channel2_name": secondary.channel.name,
            "bridge2_id": secondary.bridge_uniqueid.unwrap_or_default(),
        }),
        AttendedTransferDest::App => json!({
            "bridge1_id": bridge1_id,
            "channel2_name": secondary.channel.name,
            "app": transfer.app,
        }),
        AttendedTransferDest::Fail => unreachable!(),
    };

    engine.report_candidate(
        CelEventType::AttendedTransfer,
        &primary.channel,
        "",
        Some(&extra),
    );
}
