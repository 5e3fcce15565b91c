//! Realtime event definitions

use crate::models::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Action carried by a message event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageAction {
    Create,
}

/// Events delivered to realtime subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// A chat message was posted to a conversation
    MessageCreated {
        message: ChatMessage,
        action: MessageAction,
    },
}

impl RealtimeEvent {
    pub fn message_created(message: ChatMessage) -> Self {
        RealtimeEvent::MessageCreated {
            message,
            action: MessageAction::Create,
        }
    }

    /// Stable name used for statistics
    pub fn event_type(&self) -> &'static str {
        match self {
            RealtimeEvent::MessageCreated { .. } => "message_created",
        }
    }
}

/// Topic subscribers of a conversation listen on
pub fn conversation_topic(conversation_id: u64) -> String {
    format!("conversation_{}", conversation_id)
}

/// Event envelope with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: String,
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub event: RealtimeEvent,
}

impl EventEnvelope {
    pub fn new(topic: impl Into<String>, event: RealtimeEvent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            topic: topic.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Event statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventStats {
    pub total_events: u64,
    pub events_by_type: HashMap<String, u64>,
    /// Envelopes handed to at least one subscriber
    pub delivered_events: u64,
    pub last_event_time: Option<DateTime<Utc>>,
}

impl EventStats {
    pub fn record_event(&mut self, event_type: &str, delivered: bool) {
        self.total_events += 1;
        *self
            .events_by_type
            .entry(event_type.to_string())
            .or_insert(0) += 1;
        if delivered {
            self.delivered_events += 1;
        }
        self.last_event_time = Some(Utc::now());
    }
}
