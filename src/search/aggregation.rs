//! Facet planning and bucket computation
//!
//! Aggregation policy is static and independent of the filters applied to a
//! request, so the two can evolve and be tested separately.

use crate::models::Account;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Boundaries of the `limit` range facet
pub const LIMIT_RANGE_BOUNDARIES: [u64; 2] = [20, 50];

/// Numeric account attribute a facet is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetField {
    Score,
    Limit,
}

/// Anything carrying the numeric attributes facets count over
pub trait FacetSource {
    fn facet_value(&self, field: FacetField) -> u64;
}

impl FacetSource for Account {
    fn facet_value(&self, field: FacetField) -> u64 {
        match field {
            FacetField::Score => self.score,
            FacetField::Limit => self.limit,
        }
    }
}

/// Bucket ordering for terms facets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    Ascending,
    Descending,
}

/// Half-open range `[from, to)`; a missing bound is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBound {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl RangeBound {
    pub fn new(from: Option<u64>, to: Option<u64>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, value: u64) -> bool {
        self.from.map_or(true, |from| value >= from) && self.to.map_or(true, |to| value < to)
    }

    /// Bucket key in `from-to` form with `*` for open ends
    pub fn key(&self) -> String {
        let bound = |b: Option<u64>| b.map_or_else(|| "*".to_string(), |v| v.to_string());
        format!("{}-{}", bound(self.from), bound(self.to))
    }
}

/// A single facet definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FacetSpec {
    /// One bucket per distinct value
    Terms {
        name: String,
        field: FacetField,
        order: KeyOrder,
    },
    /// One bucket per range, always reported
    Range {
        name: String,
        field: FacetField,
        ranges: Vec<RangeBound>,
    },
}

impl FacetSpec {
    pub fn name(&self) -> &str {
        match self {
            FacetSpec::Terms { name, .. } | FacetSpec::Range { name, .. } => name,
        }
    }
}

/// Named facet definitions computed alongside a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub facets: Vec<FacetSpec>,
}

/// A realized bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<u64>,
    pub doc_count: u64,
}

/// Realized buckets for one facet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetResult {
    pub buckets: Vec<Bucket>,
}

impl FacetResult {
    /// Count for the bucket with the given key, zero when absent
    pub fn count(&self, key: &str) -> u64 {
        self.buckets
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.doc_count)
            .unwrap_or(0)
    }
}

impl AggregationSpec {
    /// Compute every facet over the full match set
    pub fn compute<'a, T, I>(&self, matches: I) -> BTreeMap<String, FacetResult>
    where
        T: FacetSource + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let matches: Vec<&T> = matches.into_iter().collect();

        self.facets
            .iter()
            .map(|facet| {
                let result = match facet {
                    FacetSpec::Terms { field, order, .. } => terms_buckets(&matches, *field, *order),
                    FacetSpec::Range { field, ranges, .. } => range_buckets(&matches, *field, ranges),
                };
                (facet.name().to_string(), result)
            })
            .collect()
    }
}

fn terms_buckets<T: FacetSource>(matches: &[&T], field: FacetField, order: KeyOrder) -> FacetResult {
    let mut counts: BTreeMap<u64, u64> = BTreeMap::new();
    for m in matches {
        *counts.entry(m.facet_value(field)).or_insert(0) += 1;
    }

    let mut buckets: Vec<Bucket> = counts
        .into_iter()
        .map(|(value, doc_count)| Bucket {
            key: value.to_string(),
            from: None,
            to: None,
            doc_count,
        })
        .collect();

    if order == KeyOrder::Descending {
        buckets.reverse();
    }

    FacetResult { buckets }
}

fn range_buckets<T: FacetSource>(
    matches: &[&T],
    field: FacetField,
    ranges: &[RangeBound],
) -> FacetResult {
    let buckets = ranges
        .iter()
        .map(|range| Bucket {
            key: range.key(),
            from: range.from,
            to: range.to,
            doc_count: matches
                .iter()
                .filter(|m| range.contains(m.facet_value(field)))
                .count() as u64,
        })
        .collect();

    FacetResult { buckets }
}

/// Derives the facet definitions for account listings
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregationPlanner;

impl AggregationPlanner {
    pub fn new() -> Self {
        Self
    }

    /// The `score` terms facet (ascending by key) and the three-bucket `limit` range facet
    pub fn plan(&self) -> AggregationSpec {
        let [low, high] = LIMIT_RANGE_BOUNDARIES;

        AggregationSpec {
            facets: vec![
                FacetSpec::Terms {
                    name: "score".to_string(),
                    field: FacetField::Score,
                    order: KeyOrder::Ascending,
                },
                FacetSpec::Range {
                    name: "limit".to_string(),
                    field: FacetField::Limit,
                    ranges: vec![
                        RangeBound::new(None, Some(low)),
                        RangeBound::new(Some(low), Some(high)),
                        RangeBound::new(Some(high), None),
                    ],
                },
            ],
        }
    }
}
