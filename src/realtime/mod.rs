//! Realtime event publishing and presence
//!
//! Message events are published on per-conversation topics. Presence answers
//! whether a conversation currently has a connected client; the connection
//! lifecycle that feeds it lives with the transport.

pub mod broadcaster;
pub mod events;
pub mod presence;

pub use broadcaster::{EventBroadcaster, RealtimePublisher};
pub use events::{conversation_topic, EventEnvelope, EventStats, MessageAction, RealtimeEvent};
pub use presence::{InMemoryPresence, PresenceTracker};
