//! Match collection over the full result set
//!
//! Every document matching a listing query is collected with the fast-field
//! values needed to order it and to count it into facets. Only the page that
//! is finally returned has its stored source loaded.

use crate::search::aggregation::{FacetField, FacetSource};
use crate::search::document::sort_field_name;
use crate::search::query::{SearchQuery, SearchSort, SortField, SortOrder};
use std::cmp::Ordering;
use tantivy::collector::{Collector, SegmentCollector};
use tantivy::columnar::{Column, StrColumn};
use tantivy::{DateTime, DocAddress, DocId, Score, SegmentOrdinal, SegmentReader};

/// Value a match is ordered by under an explicit field sort
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

/// One matching document, ready for ranking and faceting
#[derive(Debug, Clone)]
pub struct RankedMatch {
    pub address: DocAddress,
    pub relevance: Score,
    pub id: u64,
    pub score: u64,
    pub limit: u64,
    pub sort_key: Option<SortKey>,
}

impl FacetSource for RankedMatch {
    fn facet_value(&self, field: FacetField) -> u64 {
        match field {
            FacetField::Score => self.score,
            FacetField::Limit => self.limit,
        }
    }
}

/// Collects every match of a query together with its ranking inputs
pub struct MatchCollector {
    sort: Option<SortField>,
}

impl MatchCollector {
    /// Collector reading the sort key the query will be ordered by, if any
    pub fn for_query(query: &SearchQuery) -> Self {
        let sort = match query.effective_sort() {
            SearchSort::Field(field, _) => Some(field),
            SearchSort::Relevance => None,
        };
        Self { sort }
    }
}

impl Collector for MatchCollector {
    type Fruit = Vec<RankedMatch>;
    type Child = MatchSegmentCollector;

    fn for_segment(
        &self,
        segment_ord: SegmentOrdinal,
        reader: &SegmentReader,
    ) -> tantivy::Result<Self::Child> {
        let fast_fields = reader.fast_fields();

        let sort_key = match self.sort {
            None => None,
            Some(field @ (SortField::Id | SortField::Score | SortField::Limit)) => Some(
                SortKeyColumn::Unsigned(fast_fields.u64(sort_field_name(field))?),
            ),
            Some(field @ (SortField::CreatedAt | SortField::UpdatedAt)) => Some(
                SortKeyColumn::Date(fast_fields.date(sort_field_name(field))?),
            ),
            Some(field @ (SortField::FirstName | SortField::LastName)) => fast_fields
                .str(sort_field_name(field))?
                .map(SortKeyColumn::Text),
        };

        Ok(MatchSegmentCollector {
            segment_ord,
            id: fast_fields.u64("id")?,
            score: fast_fields.u64("score")?,
            limit: fast_fields.u64("limit")?,
            sort_key,
            matches: Vec::new(),
        })
    }

    fn requires_scoring(&self) -> bool {
        true
    }

    fn merge_fruits(&self, segment_fruits: Vec<Vec<RankedMatch>>) -> tantivy::Result<Self::Fruit> {
        Ok(segment_fruits.into_iter().flatten().collect())
    }
}

enum SortKeyColumn {
    Unsigned(Column<u64>),
    Date(Column<DateTime>),
    Text(StrColumn),
}

impl SortKeyColumn {
    fn read(&self, doc: DocId) -> Option<SortKey> {
        match self {
            SortKeyColumn::Unsigned(column) => column.first(doc).map(SortKey::Unsigned),
            SortKeyColumn::Date(column) => column
                .first(doc)
                .map(|date| SortKey::Signed(date.into_timestamp_secs())),
            SortKeyColumn::Text(column) => {
                let ord = column.ords().first(doc)?;
                let mut text = String::new();
                column
                    .ord_to_str(ord, &mut text)
                    .ok()?
                    .then_some(SortKey::Text(text))
            }
        }
    }
}

pub struct MatchSegmentCollector {
    segment_ord: SegmentOrdinal,
    id: Column<u64>,
    score: Column<u64>,
    limit: Column<u64>,
    sort_key: Option<SortKeyColumn>,
    matches: Vec<RankedMatch>,
}

impl SegmentCollector for MatchSegmentCollector {
    type Fruit = Vec<RankedMatch>;

    fn collect(&mut self, doc: DocId, relevance: Score) {
        self.matches.push(RankedMatch {
            address: DocAddress::new(self.segment_ord, doc),
            relevance,
            id: self.id.first(doc).unwrap_or_default(),
            score: self.score.first(doc).unwrap_or_default(),
            limit: self.limit.first(doc).unwrap_or_default(),
            sort_key: self.sort_key.as_ref().and_then(|column| column.read(doc)),
        });
    }

    fn harvest(self) -> Self::Fruit {
        self.matches
    }
}

/// Order the full match set by the query's ordering policy
///
/// Relevance order is descending score with ties broken by ascending id. A
/// boost moves boosted accounts to the front and keeps relevance order on both
/// sides; the requested field order is not applied. Without a boost the field
/// order applies, ties broken by id.
pub fn rank_matches(matches: &mut [RankedMatch], query: &SearchQuery) {
    matches.sort_by(|a, b| {
        b.relevance
            .total_cmp(&a.relevance)
            .then_with(|| a.id.cmp(&b.id))
    });

    match (&query.boost, query.effective_sort()) {
        (Some(boost), _) => matches.sort_by_key(|m| !boost.contains(m.id)),
        (None, SearchSort::Relevance) => {}
        (None, SearchSort::Field(_, order)) => matches.sort_by(|a, b| {
            let ordering = compare_keys(a, b);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        }),
    }
}

fn compare_keys(a: &RankedMatch, b: &RankedMatch) -> Ordering {
    a.sort_key
        .cmp(&b.sort_key)
        .then_with(|| a.id.cmp(&b.id))
}
