pub mod extract;
pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::config::ListingConfig;
use crate::listing::ListingService;
use crate::realtime::InMemoryPresence;
use crate::search::SearchService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub listing: Arc<ListingService>,
    /// Index maintenance
    pub search: Arc<SearchService>,
    pub listing_config: ListingConfig,
    /// Conversation connections, shared with the notification dispatcher
    pub presence: Arc<InMemoryPresence>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(listing: Arc<ListingService>, search: Arc<SearchService>) -> Self {
        Self {
            listing,
            search,
            listing_config: ListingConfig::default(),
            presence: Arc::new(InMemoryPresence::new()),
            started_at: Instant::now(),
        }
    }

    pub fn with_listing_config(mut self, listing_config: ListingConfig) -> Self {
        self.listing_config = listing_config;
        self
    }

    pub fn with_presence(mut self, presence: Arc<InMemoryPresence>) -> Self {
        self.presence = presence;
        self
    }
}
