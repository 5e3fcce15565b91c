//! Event broadcasting system
//!
//! In-process pub-sub for realtime events. Transport to clients (websocket,
//! cable, ...) subscribes here and filters by topic.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::events::{EventEnvelope, EventStats, RealtimeEvent};
use crate::notifications::NotificationTaskError;

/// Publishes realtime events to interested subscribers
#[async_trait::async_trait]
pub trait RealtimePublisher: Send + Sync {
    /// Publish an event on a topic, returning the number of subscribers reached
    async fn publish(&self, topic: &str, event: RealtimeEvent)
        -> Result<usize, NotificationTaskError>;
}

/// Event broadcaster
pub struct EventBroadcaster {
    /// Broadcast channel for events
    tx: broadcast::Sender<EventEnvelope>,
    /// Event statistics
    stats: Arc<RwLock<EventStats>>,
    /// Channel capacity
    capacity: usize,
}

impl EventBroadcaster {
    /// Create a new event broadcaster
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            stats: Arc::new(RwLock::new(EventStats::default())),
            capacity,
        }
    }

    /// Publish an envelope to all subscribers
    ///
    /// Having no subscribers is not an error.
    pub fn send(&self, envelope: EventEnvelope) -> usize {
        let event_type = envelope.event.event_type();
        let topic = envelope.topic.clone();

        // `send` only fails when there are no receivers
        let delivered = self.tx.send(envelope).unwrap_or(0);

        debug!(event_type, topic = %topic, delivered, "Published realtime event");
        self.stats.write().record_event(event_type, delivered > 0);

        delivered
    }

    /// Subscribe to all topics
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Get event statistics
    pub fn stats(&self) -> EventStats {
        self.stats.read().clone()
    }

    /// Get channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait::async_trait]
impl RealtimePublisher for EventBroadcaster {
    async fn publish(
        &self,
        topic: &str,
        event: RealtimeEvent,
    ) -> Result<usize, NotificationTaskError> {
        Ok(self.send(EventEnvelope::new(topic, event)))
    }
}
