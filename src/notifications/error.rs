use crate::error::AppError;
use thiserror::Error;

/// Failure of a single notification side effect
///
/// Only ever logged and counted; never returned to the request that triggered it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationTaskError {
    /// Outbound mail could not be composed or delivered
    #[error("Mail delivery failed: {0}")]
    Mail(String),

    /// Sender or recipient address rejected
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Realtime publish failed
    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    /// The task panicked or was cancelled
    #[error("Task aborted: {0}")]
    Aborted(String),
}

impl From<NotificationTaskError> for AppError {
    fn from(err: NotificationTaskError) -> Self {
        AppError::NotificationTask(err.to_string())
    }
}
