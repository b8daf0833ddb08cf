//! Top-level engine wiring: init/term/reload, the candidate-event gate
//! shared by every correlator, and the convenience entry points a host
//! application calls directly (`publish_user_event`, `is_enabled`).

use std::sync::{Arc, Mutex as StdMutex};

use serde_json::Value;
use tracing::{error, info};

use crate::backend::{BackendCallback, BackendRegistry};
use crate::cel_conf;
use crate::config::{needs_linkedid_acquire_on_channel_start, should_report, CelConfig, ConfigHolder, FilterDecision};
use crate::dialstatus::DialStatusStore;
use crate::error::CelResult;
use crate::event::{CelEventType, UpstreamMessage};
use crate::linkedid::LinkedIdTracker;
use crate::record::{build_record, Clock, SystemClock};
use crate::router::{CelRouter, UpstreamTopics};
use crate::snapshot::ChannelSnapshot;
use crate::{correlators, status};

/// Owns every piece of shared state a correlator touches: config,
/// linked-id tracker, dial-status store, backend registry. One instance
/// per deployment.
pub struct CelEngine {
    config: ConfigHolder,
    pub(crate) linkedids: LinkedIdTracker,
    pub(crate) dial_status: DialStatusStore,
    backends: BackendRegistry,
    clock: Box<dyn Clock + Send + Sync>,
    router: StdMutex<Option<CelRouter>>,
}

impl CelEngine {
    pub fn new(config: CelConfig) -> Self {
        CelEngine::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: CelConfig, clock: Box<dyn Clock + Send + Sync>) -> Self {
        info!(enable = config.enable, "CEL engine initialized");
        CelEngine {
            config: ConfigHolder::new(config),
            linkedids: LinkedIdTracker::new(),
            dial_status: DialStatusStore::new(),
            backends: BackendRegistry::new(),
            clock,
            router: StdMutex::new(None),
        }
    }

    /// Starts the router (§4.1): spawns one forwarder per upstream topic
    /// plus the dispatch task, and keeps the resulting `CelRouter` so a
    /// later `shutdown()` can join it. Requires the engine to be held in
    /// an `Arc` since the spawned tasks outlive this call.
    ///
    /// Deviation from `SPEC_FULL.md` §5's literal `CelEngine::shutdown(self)`
    /// signature: an engine shared across the router's tasks and any host
    /// code that also holds it cannot be consumed by value through a
    /// shared reference, so teardown state lives behind `Mutex<Option<_>>`
    /// instead and `shutdown` takes `&self`. This still satisfies the
    /// "unsubscribe-and-join" requirement — see DESIGN.md.
    pub fn start_router(self: &Arc<Self>, topics: UpstreamTopics) {
        let router = CelRouter::spawn(self.clone(), topics);
        *self.router.lock().unwrap() = Some(router);
    }

    /// Engine teardown (§4.1, §5): unsubscribes and joins the router, if
    /// one was started. After this returns, no handler fed through the
    /// router will ever fire again. A no-op if `start_router` was never
    /// called (e.g. a host that only calls `dispatch`/`publish_user_event`
    /// directly, without the async router).
    pub async fn shutdown(&self) {
        let router = self.router.lock().unwrap().take();
        if let Some(router) = router {
            router.shutdown().await;
        }
        info!("CEL engine shut down");
    }

    /// Loads configuration from `cel.conf` text and initializes the
    /// engine with it. On validation failure this returns `Err` without
    /// constructing an engine; callers that want the "graceful default
    /// config fallback" described in `SPEC_FULL.md` §9.2 should fall back
    /// to `CelEngine::new(CelConfig::default())` themselves on `Err`.
    pub fn from_conf_str(text: &str) -> CelResult<Self> {
        let config = cel_conf::load_str(text)?;
        Ok(CelEngine::new(config))
    }

    pub fn is_enabled(&self) -> bool {
        self.config.get().enable
    }

    /// Re-parses `text`, validates it, and atomically swaps it in. The
    /// previously active configuration is left untouched on any error.
    pub fn reload_config(&self, text: &str) -> CelResult<()> {
        let config = cel_conf::load_str(text)?;
        self.config.reload(config)
    }

    pub fn register_backend(&self, name: &str, callback: BackendCallback) -> CelResult<()> {
        self.backends.register(name, callback)
    }

    pub fn unregister_backend(&self, name: &str) -> CelResult<()> {
        self.backends.unregister(name)
    }

    /// `cel show status` output, exact line set per `spec.md` §6.
    pub fn status_report(&self) -> Vec<String> {
        status::status_report(&self.config.get(), &self.backends)
    }

    /// Convenience entry point for host code that wants to inject a
    /// generic CEL event directly rather than observing it through the
    /// upstream bus (mirrors `ast_cel_publish_event`, §9.4).
    pub fn publish_user_event(&self, channel: ChannelSnapshot, event: String, extra: Value) {
        self.dispatch(UpstreamMessage::CelGeneric {
            event_type: CelEventType::UserDefined.code() as i64,
            channel,
            event,
            extra,
        });
    }

    /// Router entry point (§4.1): dispatches by message type tag to the
    /// matching correlator.
    pub fn dispatch(&self, message: UpstreamMessage) {
        match message {
            UpstreamMessage::CacheUpdate { old, new } => {
                correlators::channel_diff::handle(self, old, new)
            }
            UpstreamMessage::ChannelDial(envelope) => correlators::dial::handle(self, *envelope),
            UpstreamMessage::ChannelEnteredBridge {
                bridge_uniqueid,
                channel,
            } => correlators::bridge::handle_enter(self, bridge_uniqueid, channel),
            UpstreamMessage::ChannelLeftBridge {
                bridge_uniqueid,
                channel,
            } => correlators::bridge::handle_leave(self, bridge_uniqueid, channel),
            UpstreamMessage::ParkedCall {
                kind,
                parkee,
                parker_dial_string,
                parking_lot,
            } => correlators::park::handle(self, kind, parkee, parker_dial_string, parking_lot),
            UpstreamMessage::CelGeneric {
                event_type,
                channel,
                event,
                extra,
            } => correlators::user_event::handle(self, event_type, channel, event, extra),
            UpstreamMessage::BlindTransfer {
                result_is_success,
                transferer,
                exten,
                context,
                bridge_uniqueid,
            } => correlators::transfer::handle_blind(
                self,
                result_is_success,
                transferer,
                exten,
                context,
                bridge_uniqueid,
            ),
            UpstreamMessage::AttendedTransfer(transfer) => {
                correlators::transfer::handle_attended(self, *transfer)
            }
            UpstreamMessage::CallPickup { channel, target } => {
                correlators::pickup_local::handle_pickup(self, channel, target)
            }
            UpstreamMessage::LocalOptimizationEnd { one, two } => {
                correlators::pickup_local::handle_local_optimize(self, one, two)
            }
        }
    }

    /// The shared candidate-event gate every correlator funnels through:
    /// the linkedid acquire side effect on `CHANNEL_START` (independent
    /// of whether `CHANNEL_START` itself passes the filter), the
    /// enable/event-mask/app filter, and — only if the event survives —
    /// the record builder and backend fan-out (§4.11).
    pub(crate) fn report_candidate(
        &self,
        event_type: CelEventType,
        snapshot: &ChannelSnapshot,
        user_defined_name: &str,
        extra: Option<&Value>,
    ) {
        let config = self.config.get();

        if needs_linkedid_acquire_on_channel_start(&config, event_type) {
            if let Err(err) = self.linkedids.acquire(&snapshot.linkedid) {
                error!(?err, "failed to acquire linkedid on CHANNEL_START");
            }
        }

        let appl_lower = matches!(event_type, CelEventType::AppStart | CelEventType::AppEnd)
            .then(|| snapshot.appl.to_ascii_lowercase());

        if should_report(&config, event_type, appl_lower.as_deref()) == FilterDecision::Drop {
            return;
        }

        let record = build_record(
            self.clock.as_ref(),
            snapshot,
            event_type,
            user_defined_name,
            extra,
        );
        self.backends.fan_out(&record);
    }

    /// Linked-id retirement check (§4.9): no-op if `snapshot.linkedid` is
    /// empty or `LINKEDID_END` isn't tracked. Otherwise decrements the
    /// refcount and, if this call retires the entry, emits
    /// `LINKEDID_END` attributed to `snapshot`.
    pub(crate) fn linkedid_retirement_check(&self, snapshot: &ChannelSnapshot) {
        let config = self.config.get();
        if snapshot.linkedid.is_empty() || !config.is_tracked(CelEventType::LinkedidEnd) {
            return;
        }
        if self.linkedids.release_and_check(&snapshot.linkedid) {
            self.report_candidate(CelEventType::LinkedidEnd, snapshot, "", None);
        }
    }

    /// Direct linked-id acquire used by the channel-diff correlator when
    /// an already-live channel's linkedid changes (§4.2 step 3), distinct
    /// from the config-filter's CHANNEL_START-triggered acquire. Gated on
    /// `LINKEDID_END` being tracked, matching the tracker's invariant
    /// that entries only exist while the terminal event is meaningful.
    pub(crate) fn linkedid_acquire_on_change(&self, linkedid: &str) {
        let config = self.config.get();
        if !config.is_tracked(CelEventType::LinkedidEnd) {
            return;
        }
        if let Err(err) = self.linkedids.acquire(linkedid) {
            error!(?err, "failed to acquire linkedid on linkedid change");
        }
    }
}
