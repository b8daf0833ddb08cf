//! CEL event type enumeration and the event record it produces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::snapshot::ChannelSnapshot;

/// The closed set of CEL event types. Numeric discriminants are part of
/// the external contract (backends and the config event mask both key on
/// them) and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CelEventType {
    ChannelStart = 1,
    ChannelEnd = 2,
    Answer = 3,
    Hangup = 4,
    AppStart = 5,
    AppEnd = 6,
    ParkStart = 7,
    ParkEnd = 8,
    UserDefined = 9,
    BridgeEnter = 10,
    BridgeExit = 11,
    BlindTransfer = 12,
    AttendedTransfer = 13,
    Pickup = 14,
    Forward = 15,
    LinkedidEnd = 16,
    LocalOptimize = 17,
}

impl CelEventType {
    /// All variants, in code order. Used for mask iteration in the
    /// config filter and the CLI status report.
    pub const ALL: [CelEventType; 17] = [
        CelEventType::ChannelStart,
        CelEventType::ChannelEnd,
        CelEventType::Answer,
        CelEventType::Hangup,
        CelEventType::AppStart,
        CelEventType::AppEnd,
        CelEventType::ParkStart,
        CelEventType::ParkEnd,
        CelEventType::UserDefined,
        CelEventType::BridgeEnter,
        CelEventType::BridgeExit,
        CelEventType::BlindTransfer,
        CelEventType::AttendedTransfer,
        CelEventType::Pickup,
        CelEventType::Forward,
        CelEventType::LinkedidEnd,
        CelEventType::LocalOptimize,
    ];

    /// Numeric wire code, 1..=17.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// The bit this event type occupies in a 64-bit event mask. Bit 0 is
    /// reserved for the `ALL` sentinel and is never set by a real event
    /// type, so `code()` doubles as the bit index.
    pub fn mask_bit(&self) -> u64 {
        1u64 << self.code()
    }

    /// Config-file spelling (the short, abbreviated names used in the
    /// `events =` list), matching the original engine's config table.
    /// `CHAN_START`/`CHAN_END` are deliberately different from the
    /// canonical display name used elsewhere (`CHANNEL_START`/`CHANNEL_END`).
    pub fn config_name(&self) -> &'static str {
        match self {
            CelEventType::ChannelStart => "CHAN_START",
            CelEventType::ChannelEnd => "CHAN_END",
            CelEventType::Answer => "ANSWER",
            CelEventType::Hangup => "HANGUP",
            CelEventType::AppStart => "APP_START",
            CelEventType::AppEnd => "APP_END",
            CelEventType::ParkStart => "PARK_START",
            CelEventType::ParkEnd => "PARK_END",
            CelEventType::UserDefined => "USER_DEFINED",
            CelEventType::BridgeEnter => "BRIDGE_ENTER",
            CelEventType::BridgeExit => "BRIDGE_EXIT",
            CelEventType::BlindTransfer => "BLINDTRANSFER",
            CelEventType::AttendedTransfer => "ATTENDEDTRANSFER",
            CelEventType::Pickup => "PICKUP",
            CelEventType::Forward => "FORWARD",
            CelEventType::LinkedidEnd => "LINKEDID_END",
            CelEventType::LocalOptimize => "LOCAL_OPTIMIZE",
        }
    }

    /// Parse a config-file event name (the `events =` list spelling, plus
    /// the `ALL` sentinel handled separately by the caller since it is not
    /// a real variant). Case-sensitive, per `spec.md` §6.
    pub fn parse_config_name(s: &str) -> Option<CelEventType> {
        CelEventType::ALL
            .into_iter()
            .find(|ev| ev.config_name() == s)
    }
}

impl fmt::Display for CelEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CelEventType::ChannelStart => "CHANNEL_START",
            CelEventType::ChannelEnd => "CHANNEL_END",
            CelEventType::Answer => "ANSWER",
            CelEventType::Hangup => "HANGUP",
            CelEventType::AppStart => "APP_START",
            CelEventType::AppEnd => "APP_END",
            CelEventType::ParkStart => "PARK_START",
            CelEventType::ParkEnd => "PARK_END",
            CelEventType::UserDefined => "USER_DEFINED",
            CelEventType::BridgeEnter => "BRIDGE_ENTER",
            CelEventType::BridgeExit => "BRIDGE_EXIT",
            CelEventType::BlindTransfer => "BLINDTRANSFER",
            CelEventType::AttendedTransfer => "ATTENDEDTRANSFER",
            CelEventType::Pickup => "PICKUP",
            CelEventType::Forward => "FORWARD",
            CelEventType::LinkedidEnd => "LINKEDID_END",
            CelEventType::LocalOptimize => "LOCAL_OPTIMIZE",
        };
        write!(f, "{name}")
    }
}

impl FromStr for CelEventType {
    type Err = ();

    /// Parses the canonical display name (`CHANNEL_START`, not the
    /// config-file abbreviation `CHAN_START`). Config parsing goes
    /// through `parse_config_name` instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CelEventType::ALL
            .into_iter()
            .find(|ev| ev.to_string() == s)
            .ok_or(())
    }
}

/// Immutable CEL event record, the value published to backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelEventRecord {
    pub event_type: CelEventType,
    pub event_time_sec: i64,
    pub event_time_usec: i64,
    /// Empty unless `event_type == UserDefined`.
    pub user_defined_name: String,

    pub caller_id_name: String,
    pub caller_id_number: String,
    pub caller_id_ani: String,
    pub caller_id_rdnis: String,
    pub caller_id_dnid: String,

    pub exten: String,
    pub context: String,
    pub channel_name: String,
    pub application_name: String,
    pub application_data: String,
    pub account_code: String,
    pub peer_account: String,
    pub uniqueid: String,
    pub linkedid: String,
    pub userfield: String,
    pub amaflags: i32,

    /// JSON-encoded, free-form per event type. Empty string if no extra
    /// was supplied.
    pub extra: String,

    /// Populated by some backends; always empty coming out of the
    /// builder.
    pub peer: String,
}

/// Multi-channel envelope carrying a dial attempt, as delivered by the
/// upstream dial topic (§4.5).
#[derive(Debug, Clone)]
pub struct DialEnvelope {
    pub caller: ChannelSnapshot,
    pub forward: String,
    pub dialstatus: String,
}

/// Reason codes for a `PARK_END` event, exactly the literal strings the
/// parking subsystem reports (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkEndReason {
    TimeOut,
    GiveUp,
    Unparked,
    Failed,
    Swap,
}

impl fmt::Display for ParkEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParkEndReason::TimeOut => "ParkedCallTimeOut",
            ParkEndReason::GiveUp => "ParkedCallGiveUp",
            ParkEndReason::Unparked => "ParkedCallUnparked",
            ParkEndReason::Failed => "ParkedCallFailed",
            ParkEndReason::Swap => "ParkedCallSwap",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a parked-call message, driving the parking correlator
/// (§4.6). `Started` is the only variant that opens a park; every other
/// variant closes one with its matching reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkEventKind {
    Started,
    Ended(ParkEndReason),
}

/// Upstream messages the router dispatches by type tag (§4.1). Each
/// variant corresponds to one of the ten registered bindings.
#[derive(Debug, Clone)]
pub enum UpstreamMessage {
    CacheUpdate {
        old: Option<ChannelSnapshot>,
        new: Option<ChannelSnapshot>,
    },
    ChannelDial(Box<DialEnvelope>),
    ChannelEnteredBridge {
        bridge_uniqueid: String,
        channel: ChannelSnapshot,
    },
    ChannelLeftBridge {
        bridge_uniqueid: String,
        channel: ChannelSnapshot,
    },
    ParkedCall {
        kind: ParkEventKind,
        parkee: ChannelSnapshot,
        parker_dial_string: String,
        parking_lot: String,
    },
    CelGeneric {
        event_type: i64,
        channel: ChannelSnapshot,
        event: String,
        extra: serde_json::Value,
    },
    BlindTransfer {
        result_is_success: bool,
        transferer: ChannelSnapshot,
        exten: String,
        context: String,
        bridge_uniqueid: String,
    },
    AttendedTransfer(Box<AttendedTransfer>),
    CallPickup {
        channel: ChannelSnapshot,
        target: ChannelSnapshot,
    },
    LocalOptimizationEnd {
        one: ChannelSnapshot,
        two: ChannelSnapshot,
    },
}

/// Destination kind an attended transfer resolves to (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendedTransferDest {
    BridgeMerge,
    Link,
    ThreeWay,
    App,
    Fail,
}

#[derive(Debug, Clone)]
pub struct TransferLeg {
    pub bridge_uniqueid: Option<String>,
    pub channel: ChannelSnapshot,
}

#[derive(Debug, Clone)]
pub struct AttendedTransfer {
    pub dest_type: AttendedTransferDest,
    pub to_transferee: TransferLeg,
    pub to_transfer_target: TransferLeg,
    /// Application name, populated only when `dest_type == App`.
    pub app: String,
}
