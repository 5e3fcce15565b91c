//! Account search powered by Tantivy
//!
//! The listing path turns a validated request into a single combined query:
//!
//! - **Filters**: tenant scoping, boolean flags, identity and team lists
//! - **Full text**: free text over first and last name, `*` matches all
//! - **Boosting**: listed accounts ranked ahead of everything else
//! - **Ordering**: explicit field order, suppressed while a boost is present
//! - **Facets**: `score` terms and `limit` ranges over the full match set
//!
//! Matches are collected whole with their fast-field values, ranked and
//! counted in memory, and only the requested page is read from the doc store.
//! - **Pagination**: page slice plus totals for the unpaginated match set
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           SearchService (SearchExecutor)         │
//! ├─────────────────────────────────────────────────┤
//! │  - execute()        - index_accounts()          │
//! │  - delete_account() - get_stats()               │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │           Index Manager                          │
//! ├─────────────────────────────────────────────────┤
//! │  - Schema Management                             │
//! │  - Writer / Reader                               │
//! │  - Commit and reload                             │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │              Tantivy Index                       │
//! ├─────────────────────────────────────────────────┤
//! │  - Inverted Index (first_name, last_name)       │
//! │  - Fast Fields (ids, score, limit, sort keys)   │
//! │  - Doc Store (account source)                   │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use helpdesk_directory::search::{
//!     AggregationPlanner, FilterSet, FilterValue, SearchConfig, SearchQuery, SearchService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let search = SearchService::new(SearchConfig::default()).await?;
//!
//!     let mut filters = FilterSet::new();
//!     filters.insert("company_id", FilterValue::Eq(42));
//!
//!     let query = SearchQuery::new("*")
//!         .with_filters(filters)
//!         .with_aggregations(AggregationPlanner::new().plan())
//!         .with_page(1, 100);
//!
//!     let page = search.search(&query).await?;
//!     println!("Found {} accounts", page.total_count);
//!
//!     Ok(())
//! }
//! ```

mod aggregation;
mod collector;
mod config;
mod document;
mod error;
mod filter;
mod index;
mod page;
mod query;
mod service;

pub use aggregation::{
    AggregationPlanner, AggregationSpec, Bucket, FacetField, FacetResult, FacetSource, FacetSpec,
    KeyOrder, RangeBound, LIMIT_RANGE_BOUNDARIES,
};
pub use collector::{rank_matches, MatchCollector, RankedMatch, SortKey};
pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{
    account_from_doc, build_account_schema, sort_field_name, AccountDocument, SearchDocument,
};
pub use error::{SearchError, SearchResult};
pub use filter::{BoostSpec, FilterSet, FilterValue};
pub use index::{IndexManager, IndexStats};
pub use page::{Pagination, ResultPage};
pub use query::{QueryBuilder, SearchQuery, SearchSort, SortField, SortOrder, MATCH_ALL};
pub use service::{SearchExecutor, SearchService};
