//! End-to-end listing tests against a real index

use helpdesk_directory::config::ListingConfig;
use helpdesk_directory::error::AppError;
use helpdesk_directory::listing::{ListingFilters, ListingRequest, ListingService, SortSpec};
use helpdesk_directory::models::{Account, ActorContext};
use helpdesk_directory::search::*;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to create a listing service over a fresh index
///
/// The TempDir must outlive the service.
async fn create_test_service(accounts: &[Account]) -> (TempDir, Arc<SearchService>, ListingService) {
    let temp_dir = TempDir::new().unwrap();
    let config = SearchConfig {
        index_path: temp_dir.path().to_path_buf(),
        realtime_indexing: true,
        ..Default::default()
    };

    let search = Arc::new(SearchService::new(config).await.unwrap());
    search.index_accounts(accounts).await.unwrap();

    let listing = ListingService::new(search.clone());
    (temp_dir, search, listing)
}

fn request(company_id: u64) -> helpdesk_directory::listing::ListingRequestBuilder {
    ListingRequest::builder(ActorContext::new(1, company_id))
}

fn ids(values: &[u64]) -> Option<Vec<String>> {
    Some(values.iter().map(|v| v.to_string()).collect())
}

fn directory() -> Vec<Account> {
    vec![
        Account::new(1, 42, "Ada", "Lovelace").with_scores(10, 5),
        Account::new(2, 42, "Grace", "Hopper").with_scores(30, 25),
        Account::new(3, 42, "Barbara", "Liskov").with_scores(10, 60),
        Account::new(4, 43, "Edsger", "Dijkstra").with_scores(50, 10),
    ]
}

#[tokio::test]
async fn test_boosted_accounts_come_first() {
    let accounts = vec![
        Account::new(7, 42, "Gwen", "Seven"),
        Account::new(9, 42, "Zed", "Nine"),
        Account::new(3, 42, "Alan", "Three"),
        Account::new(5, 42, "Yara", "Five"),
    ];
    let (_dir, _search, listing) = create_test_service(&accounts).await;

    // Either order would put 5 ahead of 3 if it reached the remainder
    for sort in [
        SortSpec::new(SortField::Id, SortOrder::Descending),
        SortSpec::new(SortField::FirstName, SortOrder::Descending),
    ] {
        let request = request(42)
            .query("*")
            .page(1)
            .per_page(100)
            .filters(ListingFilters {
                accounts_boosted: ids(&[7, 9]),
                ..Default::default()
            })
            .sort(sort)
            .build(&ListingConfig::default())
            .unwrap();

        let page = listing.list(&request).await.unwrap();

        assert_eq!(page.total_count, 4);
        assert!(!page.next_page);
        assert_eq!(page.account_ids(), vec![7, 9, 3, 5], "sort: {:?}", sort);
    }
}

#[tokio::test]
async fn test_boost_spans_pages() {
    let accounts: Vec<Account> = (1..=6)
        .map(|id| Account::new(id, 42, format!("N{}", id), "X"))
        .collect();
    let (_dir, _search, listing) = create_test_service(&accounts).await;

    let page = |number| {
        request(42)
            .page(number)
            .per_page(4)
            .filters(ListingFilters {
                accounts_boosted: ids(&[6, 2]),
                ..Default::default()
            })
            .build(&ListingConfig::default())
            .unwrap()
    };

    let first = listing.list(&page(1)).await.unwrap();
    assert_eq!(first.account_ids(), vec![2, 6, 1, 3]);
    assert!(first.next_page);

    let second = listing.list(&page(2)).await.unwrap();
    assert_eq!(second.account_ids(), vec![4, 5]);
    assert!(!second.next_page);
}

#[tokio::test]
async fn test_free_text_requires_every_term() {
    let accounts = vec![
        Account::new(1, 42, "Ada", "Lovelace"),
        Account::new(2, 42, "Ada", "Hopper"),
        Account::new(3, 42, "Grace", "Hopper"),
    ];
    let (_dir, _search, listing) = create_test_service(&accounts).await;

    let request = request(42)
        .query("ada hopper")
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&request).await.unwrap();

    assert_eq!(page.account_ids(), vec![2]);
    assert_eq!(page.total_count, 1);
}

#[tokio::test]
async fn test_default_order_is_first_name_descending() {
    let (_dir, _search, listing) = create_test_service(&directory()).await;

    let request = request(42).build(&ListingConfig::default()).unwrap();
    let page = listing.list(&request).await.unwrap();

    let names: Vec<&str> = page.accounts.iter().map(|a| a.first_name.as_str()).collect();
    assert_eq!(names, vec!["Grace", "Barbara", "Ada"]);
}

#[tokio::test]
async fn test_results_are_tenant_scoped() {
    let (_dir, _search, listing) = create_test_service(&directory()).await;

    // Inclusion list naming another tenant's account still cannot reach it
    let request = request(42)
        .filters(ListingFilters {
            account_ids: ids(&[1, 4]),
            ..Default::default()
        })
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&request).await.unwrap();

    assert_eq!(page.account_ids(), vec![1]);
    assert!(page.accounts.iter().all(|a| a.company_id == 42));
}

#[tokio::test]
async fn test_free_text_matches_names() {
    let (_dir, _search, listing) = create_test_service(&directory()).await;

    let request = request(42)
        .query("hopper")
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&request).await.unwrap();

    assert_eq!(page.account_ids(), vec![2]);
}

#[tokio::test]
async fn test_false_flag_filters_and_unset_flag_does_not() {
    let mut accounts = directory();
    accounts[0].chat = true;
    let (_dir, _search, listing) = create_test_service(&accounts).await;

    let unset = request(42).build(&ListingConfig::default()).unwrap();
    assert_eq!(listing.list(&unset).await.unwrap().total_count, 3);

    let chat_off = request(42)
        .filters(ListingFilters {
            chat: Some(false),
            ..Default::default()
        })
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&chat_off).await.unwrap();

    assert_eq!(page.total_count, 2);
    assert!(!page.account_ids().contains(&1));
}

#[tokio::test]
async fn test_inclusion_list_wins_over_exclusion_list() {
    let (_dir, _search, listing) = create_test_service(&directory()).await;

    let request = request(42)
        .filters(ListingFilters {
            account_ids: ids(&[1, 2]),
            non_account_ids: ids(&[2]),
            ..Default::default()
        })
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&request).await.unwrap();

    let found: HashSet<u64> = page.account_ids().into_iter().collect();
    assert_eq!(found, HashSet::from([1, 2]));
}

#[tokio::test]
async fn test_exclusion_list() {
    let (_dir, _search, listing) = create_test_service(&directory()).await;

    let request = request(42)
        .filters(ListingFilters {
            non_account_ids: ids(&[2]),
            ..Default::default()
        })
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&request).await.unwrap();

    assert_eq!(page.total_count, 2);
    assert!(!page.account_ids().contains(&2));
}

#[tokio::test]
async fn test_team_filter_matches_any_team() {
    let mut accounts = directory();
    accounts[0].team_ids = vec![1];
    accounts[1].team_ids = vec![2, 3];
    let (_dir, _search, listing) = create_test_service(&accounts).await;

    let request = request(42)
        .filters(ListingFilters {
            team_ids: ids(&[3, 9]),
            ..Default::default()
        })
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&request).await.unwrap();

    assert_eq!(page.account_ids(), vec![2]);
}

#[tokio::test]
async fn test_pagination_reports_full_match_set() {
    let accounts: Vec<Account> = (1..=7)
        .map(|id| Account::new(id, 42, format!("User{}", id), "Test"))
        .collect();
    let (_dir, _search, listing) = create_test_service(&accounts).await;

    let first = request(42).per_page(3).build(&ListingConfig::default()).unwrap();
    let page = listing.list(&first).await.unwrap();
    assert_eq!(page.accounts.len(), 3);
    assert_eq!(page.total_count, 7);
    assert_eq!(page.total_pages, 3);
    assert!(page.next_page);

    let last = request(42)
        .page(3)
        .per_page(3)
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&last).await.unwrap();
    assert_eq!(page.accounts.len(), 1);
    assert!(!page.next_page);

    let beyond = request(42)
        .page(4)
        .per_page(3)
        .build(&ListingConfig::default())
        .unwrap();
    let page = listing.list(&beyond).await.unwrap();
    assert!(page.accounts.is_empty());
    assert_eq!(page.total_count, 7);
}

#[tokio::test]
async fn test_aggregations_cover_full_match_set() {
    let (_dir, _search, listing) = create_test_service(&directory()).await;

    let request = request(42).per_page(1).build(&ListingConfig::default()).unwrap();
    let page = listing.list(&request).await.unwrap();

    assert_eq!(page.accounts.len(), 1);

    let limit = &page.aggs["limit"];
    assert_eq!(limit.count("*-20"), 1);
    assert_eq!(limit.count("20-50"), 1);
    assert_eq!(limit.count("50-*"), 1);

    let score = &page.aggs["score"];
    let keys: Vec<&str> = score.buckets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["10", "30"]);
    assert_eq!(score.count("10"), 2);
}

#[tokio::test]
async fn test_empty_result_has_all_range_buckets() {
    let (_dir, _search, listing) = create_test_service(&directory()).await;

    let request = request(99).build(&ListingConfig::default()).unwrap();
    let page = listing.list(&request).await.unwrap();

    assert_eq!(page.total_count, 0);
    assert!(!page.next_page);
    assert_eq!(page.aggs["limit"].buckets.len(), 3);
    assert!(page.aggs["limit"].buckets.iter().all(|b| b.doc_count == 0));
}

#[tokio::test]
async fn test_reindex_and_delete() {
    let (_dir, search, listing) = create_test_service(&directory()).await;

    let renamed = Account::new(1, 42, "Augusta", "King");
    search.index_account(&renamed).await.unwrap();
    search.delete_account(3).await.unwrap();

    let request = request(42).build(&ListingConfig::default()).unwrap();
    let page = listing.list(&request).await.unwrap();

    let names: Vec<&str> = page.accounts.iter().map(|a| a.first_name.as_str()).collect();
    assert_eq!(names, vec!["Grace", "Augusta"]);
}

#[tokio::test]
async fn test_malformed_query_is_not_retryable() {
    let (_dir, _search, listing) = create_test_service(&directory()).await;

    let request = request(42)
        .query("shoe_size:42")
        .build(&ListingConfig::default())
        .unwrap();
    let err = listing.list(&request).await.unwrap_err();

    assert!(matches!(err, AppError::SearchQuery(_)));
    assert!(!err.is_retryable());
}
