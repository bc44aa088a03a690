//! Broadcast hub
//!
//! Owns the live set of subscriber connections and fans serialized updates
//! out to all of them. A failed delivery marks the subscriber for removal
//! after the full iteration - the live set is never mutated mid-traversal.
//!
//! Subscribers are a trait seam so the hub needs no sockets to be exercised;
//! the WebSocket layer plugs in [`WsSubscriber`], a thin wrapper around an
//! unbounded channel drained by the per-connection socket task.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Delivery failure - the connection is considered dead.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("subscriber channel closed")]
    Closed,
}

/// A live outbound connection.
pub trait Subscriber: Send + Sync {
    fn id(&self) -> Uuid;

    /// Attempt to deliver one payload. An error removes this subscriber from
    /// the hub on the current broadcast.
    fn deliver(&self, payload: &str) -> Result<(), DeliveryError>;
}

/// Fan-out registry of live subscribers.
#[derive(Default)]
pub struct BroadcastHub {
    subscribers: Mutex<HashMap<Uuid, Arc<dyn Subscriber>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a subscriber unconditionally into the live set.
    pub fn connect(&self, subscriber: Arc<dyn Subscriber>) {
        let mut subscribers = self.subscribers.lock();
        subscribers.insert(subscriber.id(), subscriber);
        tracing::info!("Subscriber connected, {} live", subscribers.len());
    }

    /// Remove a subscriber. Idempotent - unknown ids are a no-op.
    pub fn disconnect(&self, id: Uuid) {
        let mut subscribers = self.subscribers.lock();
        if subscribers.remove(&id).is_some() {
            tracing::info!("Subscriber disconnected, {} live", subscribers.len());
        }
    }

    /// Deliver `payload` to every live subscriber, pruning the ones whose
    /// delivery fails. Broadcasting to an empty set is a no-op.
    pub fn broadcast(&self, payload: &str) {
        let mut subscribers = self.subscribers.lock();
        if subscribers.is_empty() {
            return;
        }

        let mut dead: Vec<Uuid> = Vec::new();
        for (id, subscriber) in subscribers.iter() {
            if let Err(e) = subscriber.deliver(payload) {
                tracing::warn!("Delivery to subscriber {} failed: {}", id, e);
                dead.push(*id);
            }
        }

        for id in dead {
            subscribers.remove(&id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// Channel-backed subscriber used by the WebSocket endpoint.
///
/// Delivery only fails once the receiving socket task has dropped its end, so
/// a dead connection surfaces on the next write attempt.
pub struct WsSubscriber {
    id: Uuid,
    tx: mpsc::UnboundedSender<String>,
}

impl WsSubscriber {
    /// Create a subscriber and the receiver its socket task drains.
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                id: Uuid::new_v4(),
                tx,
            }),
            rx,
        )
    }
}

impl Subscriber for WsSubscriber {
    fn id(&self) -> Uuid {
        self.id
    }

    fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        self.tx
            .send(payload.to_string())
            .map_err(|_| DeliveryError::Closed)
    }
}
