//! Aggregation topic & router (§4.1): forwards the four upstream
//! subscriptions (channel cache, bridge, parking, CEL-internal user
//! events) onto one aggregation topic and dispatches each message, in
//! arrival order, to `CelEngine::dispatch`.
//!
//! The real upstream pub/sub bus (topic/subscription/cache mechanics) is
//! an external collaborator per `spec.md` §1; this module only supplies
//! the forwarding plumbing a host wires a real bus's callbacks into via
//! each `UpstreamTopic::sender()`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::CelEngine;
use crate::event::UpstreamMessage;

/// One upstream subscription's message channel. A host feeds messages a
/// real bus delivers into `sender()`; the router owns the receiving end
/// until it spawns a forwarder for it.
pub struct UpstreamTopic {
    sender: mpsc::UnboundedSender<UpstreamMessage>,
    receiver: Option<mpsc::UnboundedReceiver<UpstreamMessage>>,
}

impl UpstreamTopic {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        UpstreamTopic {
            sender,
            receiver: Some(receiver),
        }
    }

    /// A cloneable handle callers use to publish onto this topic.
    pub fn sender(&self) -> mpsc::UnboundedSender<UpstreamMessage> {
        self.sender.clone()
    }
}

impl Default for UpstreamTopic {
    fn default() -> Self {
        Self::new()
    }
}

/// The four upstream subscriptions the router aggregates (§4.1).
pub struct UpstreamTopics {
    pub channel_cache: UpstreamTopic,
    pub bridge: UpstreamTopic,
    pub parking: UpstreamTopic,
    pub cel_internal: UpstreamTopic,
}

impl UpstreamTopics {
    pub fn new() -> Self {
        UpstreamTopics {
            channel_cache: UpstreamTopic::new(),
            bridge: UpstreamTopic::new(),
            parking: UpstreamTopic::new(),
            cel_internal: UpstreamTopic::new(),
        }
    }
}

impl Default for UpstreamTopics {
    fn default() -> Self {
        Self::new()
    }
}

/// Router (§4.1): one forwarder task per upstream topic feeding one
/// aggregation channel, plus one dispatch task draining that channel into
/// `CelEngine::dispatch`. Each dispatch is synchronous with respect to a
/// single incoming message, matching §4.1's "handlers must not assume
/// concurrent invocation of *themselves*" requirement — there is exactly
/// one dispatch task, so messages are processed one at a time, in the
/// order the aggregation channel delivers them.
pub struct CelRouter {
    forwarders: Vec<JoinHandle<()>>,
    dispatcher: JoinHandle<()>,
}

impl CelRouter {
    /// Spawns the forwarders and the dispatch task. `topics`' receivers
    /// are consumed; publish onto the topics via `UpstreamTopic::sender()`
    /// beforehand (or keep a clone of each sender around).
    pub fn spawn(engine: Arc<CelEngine>, mut topics: UpstreamTopics) -> Self {
        let (agg_tx, mut agg_rx) = mpsc::unbounded_channel::<UpstreamMessage>();

        let receivers = [
            topics.channel_cache.receiver.take(),
            topics.bridge.receiver.take(),
            topics.parking.receiver.take(),
            topics.cel_internal.receiver.take(),
        ];

        let mut forwarders = Vec::new();
        for mut rx in receivers.into_iter().flatten() {
            let tx = agg_tx.clone();
            forwarders.push(tokio::spawn(async move {
                while let Some(message) = rx.recv().await {
                    if tx.send(message).is_err() {
                        break;
                    }
                }
            }));
        }
        // Drop the router's own sender so the aggregation channel closes
        // once every forwarder has exited, rather than staying open
        // forever because of this extra clone.
        drop(agg_tx);

        let dispatcher = tokio::spawn(async move {
            while let Some(message) = agg_rx.recv().await {
                engine.dispatch(message);
            }
        });

        info!(forwarders = forwarders.len(), "CEL router started");
        CelRouter {
            forwarders,
            dispatcher,
        }
    }

    /// Unsubscribe-and-join teardown (§4.1, §5): aborts every forwarder
    /// and the dispatch task, then awaits each `JoinHandle`. Because abort
    /// only takes effect at the task's next await point and `dispatch` is
    /// a synchronous call, a message already being dispatched always runs
    /// to completion before the dispatch task can be aborted — so no
    /// handler is ever still running once this returns.
    pub async fn shutdown(self) {
        for handle in &self.forwarders {
            handle.abort();
        }
        for handle in self.forwarders {
            let _ = handle.await;
        }
        self.dispatcher.abort();
        let _ = self.dispatcher.await;
        debug!("CEL router shut down");
    }
}
