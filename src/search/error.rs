//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
///
/// Callers decide whether to retry with [`SearchError::is_transient`]:
/// availability problems are transient, malformed queries are not.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Index initialization failed
    #[error("Index initialization failed: {0}")]
    IndexInitFailed(String),

    /// Index could not serve the request right now
    #[error("Search index unavailable: {0}")]
    Unavailable(String),

    /// Query parsing failed
    #[error("Query parsing failed: {0}")]
    QueryParsingFailed(String),

    /// The constructed query references fields or values the index rejects
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Document indexing failed
    #[error("Document indexing failed: {0}")]
    IndexingFailed(String),

    /// Document deletion failed
    #[error("Document deletion failed: {0}")]
    DeletionFailed(String),

    /// A stored document could not be decoded
    #[error("Index corruption detected: {0}")]
    IndexCorruption(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SearchError {
    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::IndexInitFailed(_) | SearchError::Unavailable(_) | SearchError::IoError(_)
        )
    }

    /// Whether the query itself was malformed
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            SearchError::QueryParsingFailed(_) | SearchError::InvalidQuery(_)
        )
    }
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        use tantivy::TantivyError;

        match err {
            TantivyError::FieldNotFound(_)
            | TantivyError::InvalidArgument(_)
            | TantivyError::SchemaError(_) => SearchError::InvalidQuery(err.to_string()),
            _ => SearchError::Unavailable(err.to_string()),
        }
    }
}

impl From<tantivy::query::QueryParserError> for SearchError {
    fn from(err: tantivy::query::QueryParserError) -> Self {
        SearchError::QueryParsingFailed(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        if err.is_transient() {
            return AppError::SearchUnavailable(err.to_string());
        }
        if err.is_query_error() {
            return AppError::SearchQuery(err.to_string());
        }
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
