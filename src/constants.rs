//! Engine-wide constants and configuration defaults

/// Number of bits in the event-type bitmask (`events` field of `CelConfig`).
/// Event type codes run 1..=17; bit 0 is unused so that the zero mask
/// unambiguously means "nothing tracked".
pub const EVENT_MASK_BITS: u32 = 64;

/// `cel.conf` section name holding the engine's own settings.
pub const SECTION_GENERAL: &str = "general";

/// `cel.conf` sections that are recognized but intentionally ignored by
/// this engine (consumed by other subsystems in the original deployment).
pub const SKIPPED_SECTIONS: &[&str] = &["manager", "radius"];

/// `cel.conf` key names within `[general]`.
pub const KEY_ENABLE: &str = "enable";
pub const KEY_DATEFORMAT: &str = "dateformat";
pub const KEY_EVENTS: &str = "events";
pub const KEY_APPS: &str = "apps";

/// Sentinel token accepted only by the `events =` parser, meaning "track
/// every event type". It is not a `CelEventType` discriminant.
pub const EVENTS_ALL_SENTINEL: &str = "ALL";

/// Default value of `enable` when `cel.conf` omits the key.
pub const DEFAULT_ENABLE: bool = false;

/// CLI status line prefixes, exactly as printed by `cel show status`.
pub const STATUS_ENABLED_LINE: &str = "CEL Logging: Enabled";
pub const STATUS_DISABLED_LINE: &str = "CEL Logging: Disabled";
pub const STATUS_EVENT_PREFIX: &str = "CEL Tracking Event: ";
pub const STATUS_APP_PREFIX: &str = "CEL Tracking Application: ";
pub const STATUS_SUBSCRIBER_PREFIX: &str = "CEL Event Subscriber: ";
