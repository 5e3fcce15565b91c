//! Main search service implementation

use crate::models::Account;
use crate::search::collector::{rank_matches, MatchCollector};
use crate::search::config::SearchConfig;
use crate::search::document::{account_from_doc, AccountDocument};
use crate::search::error::{SearchError, SearchResult};
use crate::search::filter::{FilterSet, FilterValue};
use crate::search::index::{IndexManager, IndexStats};
use crate::search::page::{Pagination, ResultPage};
use crate::search::query::{QueryBuilder, SearchQuery, MATCH_ALL};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tantivy::TantivyDocument;
use tracing::debug;

/// Executes a combined listing query against a search index
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Run the query and return one page of results
    async fn execute(&self, query: &SearchQuery) -> SearchResult<ResultPage>;
}

/// Account search over a local Tantivy index
pub struct SearchService {
    /// Index manager
    index_manager: Arc<IndexManager>,

    /// Configuration
    config: SearchConfig,
}

impl SearchService {
    /// Create a new search service
    pub async fn new(config: SearchConfig) -> SearchResult<Self> {
        let index_manager = Arc::new(IndexManager::new(config.clone()).await?);

        Ok(Self {
            index_manager,
            config,
        })
    }

    /// Search for accounts
    ///
    /// Ordering and facets cover the full match set; only the requested page
    /// is loaded from the document store.
    pub async fn search(&self, query: &SearchQuery) -> SearchResult<ResultPage> {
        let start_time = Instant::now();

        let query_builder = QueryBuilder::new(
            self.index_manager.schema().clone(),
            self.index_manager.index().clone(),
        );
        let tantivy_query = query_builder.build(query)?;

        let searcher = self.index_manager.searcher();
        let schema = self.index_manager.schema().clone();
        let request = query.clone();

        let (accounts, pagination, aggs) = tokio::task::spawn_blocking(move || {
            let mut matches =
                searcher.search(&*tantivy_query, &MatchCollector::for_query(&request))?;
            rank_matches(&mut matches, &request);

            let aggs = request.aggregations.compute(&matches);
            let pagination =
                Pagination::new(request.page, request.per_page, matches.len() as u64);

            let accounts = matches[pagination.window(matches.len())]
                .iter()
                .map(|hit| {
                    let retrieved: TantivyDocument = searcher.doc(hit.address)?;
                    account_from_doc(&retrieved, &schema)
                })
                .collect::<SearchResult<Vec<_>>>()?;

            Ok::<_, SearchError>((accounts, pagination, aggs))
        })
        .await
        .map_err(|e| SearchError::Unavailable(format!("Search task failed: {}", e)))??;

        let took = start_time.elapsed().as_millis() as u64;

        debug!(
            total_count = pagination.total_count,
            page = query.page,
            per_page = query.per_page,
            took_ms = took,
            "Account search executed"
        );

        Ok(ResultPage::assemble(accounts, pagination, aggs, took))
    }

    /// Service configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Index a single account
    pub async fn index_account(&self, account: &Account) -> SearchResult<()> {
        let document = AccountDocument::from(account);
        self.index_manager.index_document(&document).await
    }

    /// Index multiple accounts
    pub async fn index_accounts(&self, accounts: &[Account]) -> SearchResult<usize> {
        let documents: Vec<_> = accounts.iter().map(AccountDocument::from).collect();
        self.index_manager.index_documents(&documents).await
    }

    /// Whether an account is indexed under the given tenant
    pub async fn contains_account(&self, company_id: u64, account_id: u64) -> SearchResult<bool> {
        let mut filters = FilterSet::new();
        filters.insert("company_id", FilterValue::Eq(company_id));
        filters.insert("id", FilterValue::Eq(account_id));

        let query = SearchQuery::new(MATCH_ALL)
            .with_filters(filters)
            .with_page(1, 1);
        Ok(self.search(&query).await?.total_count > 0)
    }

    /// Delete an account from the index
    pub async fn delete_account(&self, account_id: u64) -> SearchResult<()> {
        self.index_manager.delete_document(account_id).await
    }

    /// Get index statistics
    pub async fn get_stats(&self) -> SearchResult<IndexStats> {
        self.index_manager.get_stats().await
    }

    /// Commit pending changes
    pub async fn commit(&self) -> SearchResult<()> {
        self.index_manager.commit().await
    }

    /// Clear the entire index
    pub async fn clear_index(&self) -> SearchResult<()> {
        self.index_manager.clear_index().await
    }
}

#[async_trait]
impl SearchExecutor for SearchService {
    async fn execute(&self, query: &SearchQuery) -> SearchResult<ResultPage> {
        self.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::aggregation::AggregationPlanner;
    use tempfile::TempDir;

    async fn create_test_service(temp_dir: &TempDir) -> SearchService {
        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        SearchService::new(config).await.unwrap()
    }

    fn tenant_filters(company_id: u64) -> FilterSet {
        let mut filters = FilterSet::new();
        filters.insert("company_id", FilterValue::Eq(company_id));
        filters
    }

    #[tokio::test]
    async fn test_service_creation() {
        let temp_dir = TempDir::new().unwrap();
        let service = create_test_service(&temp_dir).await;
        let stats = service.get_stats().await.unwrap();
        assert_eq!(stats.total_documents, 0);
    }

    #[tokio::test]
    async fn test_index_and_search_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let service = create_test_service(&temp_dir).await;

        service
            .index_accounts(&[
                Account::new(1, 42, "Margaret", "Hamilton"),
                Account::new(2, 42, "Barbara", "Liskov"),
            ])
            .await
            .unwrap();

        let query = SearchQuery::new("liskov").with_filters(tenant_filters(42));
        let page = service.search(&query).await.unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.account_ids(), vec![2]);
    }

    #[tokio::test]
    async fn test_contains_account_is_tenant_scoped() {
        let temp_dir = TempDir::new().unwrap();
        let service = create_test_service(&temp_dir).await;

        service
            .index_account(&Account::new(7, 42, "Grace", "Hopper"))
            .await
            .unwrap();

        assert!(service.contains_account(42, 7).await.unwrap());
        assert!(!service.contains_account(43, 7).await.unwrap());

        service.delete_account(7).await.unwrap();
        assert!(!service.contains_account(42, 7).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_index_reports_zero_buckets() {
        let temp_dir = TempDir::new().unwrap();
        let service = create_test_service(&temp_dir).await;

        let query = SearchQuery::new("*")
            .with_filters(tenant_filters(42))
            .with_aggregations(AggregationPlanner::new().plan());
        let page = service.search(&query).await.unwrap();

        assert_eq!(page.total_count, 0);
        assert!(!page.next_page);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.aggs["limit"].buckets.len(), 3);
    }

    #[tokio::test]
    async fn test_ordering_paging_and_facets_span_segments() {
        let temp_dir = TempDir::new().unwrap();
        let service = create_test_service(&temp_dir).await;

        // One commit per account, so matches live in separate segments
        for id in [3, 1, 5, 2, 4] {
            service
                .index_account(&Account::new(id, 42, format!("N{}", id), "X").with_scores(1, 60))
                .await
                .unwrap();
        }

        let query = |page| {
            SearchQuery::new("*")
                .with_filters(tenant_filters(42))
                .with_aggregations(AggregationPlanner::new().plan())
                .with_page(page, 2)
        };

        let first = service.search(&query(1)).await.unwrap();
        assert_eq!(first.account_ids(), vec![5, 4]);
        assert!(first.next_page);
        assert_eq!(first.total_count, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.aggs["limit"].count("50-*"), 5);
        assert_eq!(first.aggs["score"].count("1"), 5);

        let second = service.search(&query(2)).await.unwrap();
        assert_eq!(second.account_ids(), vec![3, 2]);
        assert!(second.next_page);

        let third = service.search(&query(3)).await.unwrap();
        assert_eq!(third.account_ids(), vec![1]);
        assert!(!third.next_page);
        assert_eq!(third.aggs["limit"].count("50-*"), 5);
    }
}
