//! Channel snapshot — the immutable input value the engine correlates over.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Channel call-progress state, as carried by a `ChannelSnapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelState {
    Down,
    Reserved,
    OffHook,
    Dialing,
    Ring,
    Ringing,
    Up,
    BusyTone,
    DialingOffHook,
    PreRing,
    Dead,
}

impl ChannelState {
    /// Whether this state represents a fully torn-down channel. Kept
    /// distinct from the enum variant check so callers match the spec's
    /// own vocabulary (`new.DEAD`) rather than reasoning about the enum.
    pub fn is_dead(&self) -> bool {
        matches!(self, ChannelState::Dead)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelState::Down => "Down",
            ChannelState::Reserved => "Rsrvd",
            ChannelState::OffHook => "OffHook",
            ChannelState::Dialing => "Dialing",
            ChannelState::Ring => "Ring",
            ChannelState::Ringing => "Ringing",
            ChannelState::Up => "Up",
            ChannelState::BusyTone => "Busy",
            ChannelState::DialingOffHook => "Dialing Offhook",
            ChannelState::PreRing => "Pre-ring",
            ChannelState::Dead => "Hungup",
        };
        write!(f, "{s}")
    }
}

/// Bitflags describing channel technology properties. Only `INTERNAL` is
/// read by any correlator; the others are carried because the original
/// `switch_channel_tech_properties` bit set contains them, and exposing a
/// single-purpose bit type would be a narrower model than the snapshot
/// this crate claims to represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechProperties(u32);

impl TechProperties {
    pub const NONE: TechProperties = TechProperties(0);
    pub const INTERNAL: TechProperties = TechProperties(1 << 0);
    pub const AUTO_ANSWER: TechProperties = TechProperties(1 << 1);
    pub const NOT_TRANSFERABLE: TechProperties = TechProperties(1 << 2);
    pub const MEDIA_BRIDGE: TechProperties = TechProperties(1 << 3);

    pub fn contains(&self, other: TechProperties) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_internal(&self) -> bool {
        self.contains(TechProperties::INTERNAL)
    }
}

impl std::ops::BitOr for TechProperties {
    type Output = TechProperties;
    fn bitor(self, rhs: TechProperties) -> TechProperties {
        TechProperties(self.0 | rhs.0)
    }
}

/// Caller-ID fields carried on every snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerId {
    pub name: String,
    pub number: String,
    pub ani: String,
    pub rdnis: String,
    pub dnid: String,
}

/// Immutable value copy of a channel's state at an instant, as delivered
/// by a cache-update message from the upstream snapshot producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub uniqueid: String,
    pub linkedid: String,
    pub name: String,
    pub state: Option<ChannelState>,
    pub appl: String,
    pub data: String,
    pub context: String,
    pub exten: String,
    pub amaflags: i32,
    pub accountcode: String,
    pub peeraccount: String,
    pub userfield: String,
    pub caller_id: CallerId,
    pub hangupcause: i32,
    pub hangupsource: String,
    pub tech_properties: TechProperties,
}

impl ChannelSnapshot {
    /// Whether `new.DEAD` per the spec's own shorthand.
    pub fn is_dead(&self) -> bool {
        self.state.map(|s| s.is_dead()).unwrap_or(false)
    }

    pub fn is_internal(&self) -> bool {
        self.tech_properties.is_internal()
    }
}
