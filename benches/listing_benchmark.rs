//! Criterion benchmarks for account listing
//!
//! Covers request-to-query translation, in-memory ranking and a full
//! listing against a populated index.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use helpdesk_directory::config::ListingConfig;
use helpdesk_directory::listing::{
    ListingFilters, ListingRequest, ListingService, QueryFilterBuilder,
};
use helpdesk_directory::models::{Account, ActorContext};
use helpdesk_directory::search::{
    rank_matches, BoostSpec, RankedMatch, SearchConfig, SearchQuery, SearchService, SearchSort,
    SortField, SortKey, SortOrder,
};
use std::sync::Arc;
use tantivy::DocAddress;
use tempfile::TempDir;

fn accounts(count: u64) -> Vec<Account> {
    (1..=count)
        .map(|id| {
            let mut account = Account::new(id, 42, format!("User{:05}", id), "Bench");
            account.chat = id % 2 == 0;
            account.on_duty = id % 3 == 0;
            account.team_ids = vec![id % 10];
            account.with_scores(id % 7, id % 80)
        })
        .collect()
}

fn filtered_request() -> ListingRequest {
    let ids = |range: std::ops::Range<u64>| Some(range.map(|id| id.to_string()).collect());

    ListingRequest::builder(ActorContext::new(1, 42))
        .query("bench")
        .filters(ListingFilters {
            chat: Some(true),
            on_duty: Some(false),
            non_account_ids: ids(100..150),
            team_ids: ids(0..5),
            accounts_boosted: ids(1..20),
            ..Default::default()
        })
        .build(&ListingConfig::default())
        .expect("valid request")
}

/// Benchmark translating a request into filters and boost
fn bench_filter_build(c: &mut Criterion) {
    let builder = QueryFilterBuilder::new();
    let request = filtered_request();

    c.bench_function("filter_build", |b| {
        b.iter(|| {
            let filters = builder.build(black_box(&request)).unwrap();
            let boost = builder.boost(black_box(&request)).unwrap();
            black_box((filters, boost))
        });
    });
}

fn matches(count: u64) -> Vec<RankedMatch> {
    (1..=count)
        .map(|id| RankedMatch {
            address: DocAddress::new(0, id as u32),
            relevance: 1.0,
            id,
            score: id % 7,
            limit: id % 80,
            sort_key: Some(SortKey::Unsigned(id % 7)),
        })
        .collect()
}

/// Benchmark ranking a match set with and without a boost
fn bench_rank_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_matches");

    for size in [100u64, 1_000, 10_000] {
        let matched = matches(size);
        group.throughput(Throughput::Elements(size));

        let sorted = SearchQuery::new("*")
            .with_sort(SearchSort::Field(SortField::Score, SortOrder::Descending));
        group.bench_with_input(BenchmarkId::new("sorted", size), &matched, |b, matched| {
            b.iter(|| {
                let mut ranked = matched.clone();
                rank_matches(&mut ranked, &sorted);
                black_box(ranked)
            });
        });

        let boosted = SearchQuery::new("*").with_boost(Some(BoostSpec::new((1..50).collect())));
        group.bench_with_input(BenchmarkId::new("boosted", size), &matched, |b, matched| {
            b.iter(|| {
                let mut ranked = matched.clone();
                rank_matches(&mut ranked, &boosted);
                black_box(ranked)
            });
        });
    }

    group.finish();
}

/// Benchmark a full listing against a populated index
fn bench_listing(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let dir = TempDir::new().expect("temp dir");

    let listing = rt.block_on(async {
        let config = SearchConfig {
            index_path: dir.path().to_path_buf(),
            ..Default::default()
        };
        let search = Arc::new(SearchService::new(config).await.expect("search service"));
        search.index_accounts(&accounts(5_000)).await.expect("index");
        search.commit().await.expect("commit");
        ListingService::new(search)
    });

    let match_all = ListingRequest::builder(ActorContext::new(1, 42))
        .build(&ListingConfig::default())
        .expect("valid request");
    let filtered = filtered_request();

    let mut group = c.benchmark_group("listing");
    group.bench_function("match_all", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(listing.list(&match_all).await.unwrap()) });
    });
    let deep_page = ListingRequest::builder(ActorContext::new(1, 42))
        .page(40)
        .per_page(100)
        .build(&ListingConfig::default())
        .expect("valid request");
    group.bench_function("deep_page", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(listing.list(&deep_page).await.unwrap()) });
    });
    group.bench_function("filtered_boosted", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(listing.list(&filtered).await.unwrap()) });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_filter_build,
    bench_rank_matches,
    bench_listing
);
criterion_main!(benches);
