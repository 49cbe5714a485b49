//! Realtime event channel and background delivery.
//!
//! DESIGN
//! ======
//! A [`RealtimeChannel`] is an explicit pub/sub hub owned by whoever wires
//! the session together; there is no process-wide bus. Subscribers register
//! with [`RealtimeChannel::subscribe`] and get back a [`Subscription`]
//! handle. Dropping the handle (or calling [`Subscription::unsubscribe`])
//! detaches the subscriber before it returns, so no event published
//! afterwards reaches it.
//!
//! [`RealtimeChannel::publish`] delivers synchronously on the caller's
//! context, one subscriber after another. The transport normally does not
//! call `publish` itself: it pushes events into a bounded
//! [`delivery_queue`], and [`spawn_delivery_task`] drains that queue on a
//! tokio task, which is the background delivery context the cache is
//! written against.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::CacheConfig;

/// An inbound realtime message wrapping an opaque JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeEvent {
    payload: String,
}

impl RealtimeEvent {
    /// Wrap a raw payload as received from the transport.
    #[must_use]
    pub fn new(payload: impl Into<String>) -> Self {
        Self { payload: payload.into() }
    }

    /// Wrap a structured payload.
    #[must_use]
    pub fn from_value(payload: &Value) -> Self {
        Self { payload: payload.to_string() }
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Receiver side of the channel.
pub trait RealtimeSubscriber: Send + Sync {
    /// Called on the delivery context for every published event.
    fn on_realtime_event(&self, event: &RealtimeEvent);
}

type SubscriberMap = RwLock<HashMap<Uuid, Arc<dyn RealtimeSubscriber>>>;

/// Instance-owned publish/subscribe channel for realtime events.
///
/// Cloning is cheap; clones share the same subscriber set.
#[derive(Clone, Default)]
pub struct RealtimeChannel {
    subscribers: Arc<SubscriberMap>,
}

impl RealtimeChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber`. It stays attached until the returned handle is
    /// dropped or explicitly unsubscribed.
    #[must_use = "dropping the subscription detaches the subscriber immediately"]
    pub fn subscribe(&self, subscriber: Arc<dyn RealtimeSubscriber>) -> Subscription {
        let id = Uuid::new_v4();
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, subscriber);
        debug!(%id, "realtime channel: subscriber attached");
        Subscription { id, subscribers: Arc::downgrade(&self.subscribers) }
    }

    /// Deliver `event` to every current subscriber. Returns how many received it.
    ///
    /// The subscriber set is snapshotted before delivery, so subscribers may
    /// subscribe or unsubscribe from inside their callback.
    pub fn publish(&self, event: &RealtimeEvent) -> usize {
        let targets: Vec<Arc<dyn RealtimeSubscriber>> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for subscriber in &targets {
            subscriber.on_realtime_event(event);
        }
        targets.len()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Handle for one registration on a [`RealtimeChannel`].
pub struct Subscription {
    id: Uuid,
    subscribers: Weak<SubscriberMap>,
}

impl Subscription {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Detach now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return;
        };
        subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
        debug!(id = %self.id, "realtime channel: subscriber detached");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Bounded queue the transport pushes inbound events into.
#[must_use]
pub fn delivery_queue(
    config: &CacheConfig,
) -> (mpsc::Sender<RealtimeEvent>, mpsc::Receiver<RealtimeEvent>) {
    mpsc::channel(config.delivery_queue_capacity.max(1))
}

/// Spawn the background delivery task.
///
/// Events are published in the order they were queued. The task ends once
/// every sender for `rx` has been dropped and the queue is drained.
pub fn spawn_delivery_task(
    channel: RealtimeChannel,
    mut rx: mpsc::Receiver<RealtimeEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut delivered: u64 = 0;
        while let Some(event) = rx.recv().await {
            channel.publish(&event);
            delivered += 1;
        }
        info!(delivered, "realtime delivery task finished");
    })
}
