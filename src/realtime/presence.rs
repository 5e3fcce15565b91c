//! Conversation presence tracking

use dashmap::DashMap;
use tracing::debug;

/// Answers whether anyone is connected to a conversation's realtime channel
pub trait PresenceTracker: Send + Sync {
    fn is_online(&self, conversation_id: u64) -> bool;
}

/// Counts open client connections per conversation
#[derive(Debug, Default)]
pub struct InMemoryPresence {
    connections: DashMap<u64, usize>,
}

impl InMemoryPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a client subscribing to a conversation
    pub fn connect(&self, conversation_id: u64) {
        let mut count = self.connections.entry(conversation_id).or_insert(0);
        *count += 1;
        debug!(conversation_id, connections = *count, "Client connected");
    }

    /// Record a client leaving; extra calls are ignored
    pub fn disconnect(&self, conversation_id: u64) {
        let remaining = self
            .connections
            .get_mut(&conversation_id)
            .map(|mut count| {
                *count = count.saturating_sub(1);
                *count
            });

        if remaining == Some(0) {
            self.connections.remove_if(&conversation_id, |_, count| *count == 0);
        }
        debug!(conversation_id, "Client disconnected");
    }

    pub fn connection_count(&self, conversation_id: u64) -> usize {
        self.connections
            .get(&conversation_id)
            .map(|count| *count)
            .unwrap_or(0)
    }
}

impl PresenceTracker for InMemoryPresence {
    fn is_online(&self, conversation_id: u64) -> bool {
        self.connection_count(conversation_id) > 0
    }
}
