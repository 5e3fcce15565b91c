use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message posted to a ticket conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub conversation_id: u64,
    pub author_id: u64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Recipient of a message notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub account_id: u64,

    /// Delivery address
    pub email: String,

    /// Email confirmation token; email is only sent when present
    #[serde(default)]
    pub email_token: Option<String>,
}

impl Recipient {
    /// Whether the recipient has confirmed their email address
    pub fn has_email_token(&self) -> bool {
        self.email_token
            .as_deref()
            .map(|token| !token.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Tenant information needed to send mail on its behalf
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tenant {
    pub id: u64,

    /// Domain outbound mail is sent from
    pub email_domain: String,

    /// Whether the domain passed sender verification
    #[serde(default)]
    pub email_domain_verified: bool,
}

/// Message-created domain event that may trigger notifications
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageEvent {
    pub message: ChatMessage,

    /// Subject of the ticket the conversation belongs to
    pub ticket_subject: String,

    /// Plain-text body used for the email
    pub description_txt: String,

    /// No agent is likely to pick the message up right now
    #[serde(default)]
    pub unavailable_agent: bool,

    pub recipient: Recipient,

    pub tenant: Tenant,
}
