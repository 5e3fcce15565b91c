//! Helpdesk account directory
//!
//! Faceted, tenant-scoped account search over a Tantivy index, plus
//! fire-and-forget notification dispatch (email and realtime broadcast) for
//! chat messages nobody is around to answer.

pub mod api;
pub mod config;
pub mod error;
pub mod listing;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod realtime;
pub mod search;

pub use error::{AppError, Result};
