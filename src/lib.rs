//! Channel Event Logging (CEL) correlation and fan-out engine.
//!
//! This crate consumes live call-processing state from an upstream
//! pub/sub bus (channel cache, bridge, parking, and CEL-internal user
//! event topics), correlates it into well-typed CEL event records, and
//! fans those records out to a dynamically registered set of backend
//! sinks.
//!
//! # Architecture
//!
//! - [`engine::CelEngine`] owns the shared state (configuration, the
//!   linked-id lifetime tracker, the dial-status carry-over store, the
//!   backend registry) and exposes the single [`engine::CelEngine::dispatch`]
//!   entry point a router feeds upstream messages into.
//! - [`correlators`] hold the stateful translation logic: channel-diff,
//!   bridge, transfer, dial, parking, pickup/local-optimization, and
//!   generic user events.
//! - [`config`] and [`cel_conf`] hold the configuration value type and
//!   its `cel.conf` loader.
//!
//! # Example
//!
//! ```rust
//! use cel_engine::config::CelConfig;
//! use cel_engine::engine::CelEngine;
//! use cel_engine::event::{CelEventType, UpstreamMessage};
//! use cel_engine::snapshot::ChannelSnapshot;
//! use std::sync::Arc;
//!
//! let mut events_mask = 0u64;
//! for ev in CelEventType::ALL {
//!     events_mask |= ev.mask_bit();
//! }
//! let engine = CelEngine::new(CelConfig {
//!     enable: true,
//!     dateformat: None,
//!     events_mask,
//!     apps: Default::default(),
//! });
//! engine
//!     .register_backend("log", Arc::new(|record| println!("{:?}", record.event_type)))
//!     .unwrap();
//!
//! engine.dispatch(UpstreamMessage::CacheUpdate {
//!     old: None,
//!     new: Some(ChannelSnapshot {
//!         uniqueid: "1".into(),
//!         linkedid: "L1".into(),
//!         ..Default::default()
//!     }),
//! });
//! ```

pub mod backend;
pub mod cel_conf;
pub mod config;
pub mod constants;
pub mod correlators;
pub mod dialstatus;
pub mod engine;
pub mod error;
pub mod event;
pub mod fabricate;
pub mod linkedid;
pub mod record;
pub mod router;
pub mod snapshot;
pub mod status;

pub use backend::{BackendCallback, BackendRegistry};
pub use config::CelConfig;
pub use engine::CelEngine;
pub use error::{CelError, CelResult};
pub use event::{CelEventRecord, CelEventType, UpstreamMessage};
pub use router::{CelRouter, UpstreamTopic, UpstreamTopics};
pub use snapshot::ChannelSnapshot;
