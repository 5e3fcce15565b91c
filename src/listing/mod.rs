//! Account listing: request model, filter building and orchestration
//!
//! A listing request is validated into a [`ListingRequest`], translated into
//! filters and a boost by [`QueryFilterBuilder`], combined with the static
//! facet plan and executed once against the search index.

mod error;
mod filter;
mod request;
mod service;

pub use error::ValidationError;
pub use filter::QueryFilterBuilder;
pub use request::{
    parse_count, parse_flag, split_list, ListingFilters, ListingParams, ListingRequest,
    ListingRequestBuilder, SortSpec,
};
pub use service::ListingService;
