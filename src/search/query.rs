//! Search query building

use crate::search::aggregation::AggregationSpec;
use crate::search::document::SEARCH_FIELDS;
use crate::search::error::{SearchError, SearchResult};
use crate::search::filter::{BoostSpec, FilterSet, FilterValue};
use serde::{Deserialize, Serialize};
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query, QueryParser, TermQuery, TermSetQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema};
use tantivy::{Index, Term};

/// Query text that matches every document
pub const MATCH_ALL: &str = "*";

/// Sort order for search results
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortOrder {
    #[strum(serialize = "asc", serialize = "ascending")]
    Ascending,
    #[strum(serialize = "desc", serialize = "descending")]
    Descending,
}

/// Account attribute results can be ordered by
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortField {
    Id,
    FirstName,
    LastName,
    Score,
    Limit,
    CreatedAt,
    UpdatedAt,
}

/// Requested ordering of a result set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchSort {
    /// Index relevance order
    Relevance,
    /// Explicit field ordering
    Field(SortField, SortOrder),
}

impl Default for SearchSort {
    /// Descending by first name
    fn default() -> Self {
        Self::Field(SortField::FirstName, SortOrder::Descending)
    }
}

/// Combined query issued to the search index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free text matched against the name fields
    pub text: String,

    /// Filters to apply
    pub filters: FilterSet,

    /// Entities ranked first
    pub boost: Option<BoostSpec>,

    /// Sorting criteria, ignored while a boost is present
    pub sort: SearchSort,

    /// Facets to compute over the full match set
    pub aggregations: AggregationSpec,

    /// 1-based page number
    pub page: u32,

    /// Page size
    pub per_page: u32,
}

impl SearchQuery {
    /// Create a new search query matching all documents
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filters: FilterSet::default(),
            boost: None,
            sort: SearchSort::default(),
            aggregations: AggregationSpec::default(),
            page: 1,
            per_page: 20,
        }
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_boost(mut self, boost: Option<BoostSpec>) -> Self {
        self.boost = boost;
        self
    }

    pub fn with_sort(mut self, sort: SearchSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_aggregations(mut self, aggregations: AggregationSpec) -> Self {
        self.aggregations = aggregations;
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Ordering actually applied: a boost suppresses explicit ordering
    pub fn effective_sort(&self) -> SearchSort {
        if self.boost.is_some() {
            SearchSort::Relevance
        } else {
            self.sort
        }
    }

    /// Whether the text matches everything
    pub fn is_match_all(&self) -> bool {
        let text = self.text.trim();
        text.is_empty() || text == MATCH_ALL
    }
}

/// Query builder for constructing Tantivy queries
pub struct QueryBuilder {
    schema: Schema,
    index: Index,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new(schema: Schema, index: Index) -> Self {
        Self { schema, index }
    }

    /// Build a Tantivy query from a SearchQuery
    pub fn build(&self, search_query: &SearchQuery) -> SearchResult<Box<dyn Query>> {
        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        // Main text query over the name fields
        if !search_query.is_match_all() {
            let text_fields = SEARCH_FIELDS
                .iter()
                .map(|name| self.field(name))
                .collect::<SearchResult<Vec<_>>>()?;

            // Every term must match, in either name field
            let mut query_parser = QueryParser::for_index(&self.index, text_fields);
            query_parser.set_conjunction_by_default();
            let parsed_query = query_parser.parse_query(search_query.text.trim())?;
            subqueries.push((Occur::Must, parsed_query));
        }

        for (name, value) in search_query.filters.iter() {
            let field = self.field(name)?;
            match value {
                FilterValue::Bool(flag) => {
                    subqueries.push((Occur::Must, term_query(Term::from_field_bool(field, *flag))));
                }
                FilterValue::Eq(id) => {
                    subqueries.push((Occur::Must, term_query(Term::from_field_u64(field, *id))));
                }
                FilterValue::AnyOf(ids) => {
                    subqueries.push((Occur::Must, term_set_query(field, ids)));
                }
                FilterValue::NotIn(ids) => {
                    subqueries.push((Occur::MustNot, term_set_query(field, ids)));
                }
            }
        }

        // A boolean query needs at least one positive clause
        if !subqueries.iter().any(|(occur, _)| *occur != Occur::MustNot) {
            subqueries.push((Occur::Must, Box::new(AllQuery)));
        }

        if subqueries.len() == 1 {
            if let Some((_, query)) = subqueries.pop() {
                return Ok(query);
            }
        }
        Ok(Box::new(BooleanQuery::from(subqueries)))
    }

    fn field(&self, name: &str) -> SearchResult<Field> {
        self.schema
            .get_field(name)
            .map_err(|_| SearchError::InvalidQuery(format!("Unknown field '{}'", name)))
    }
}

fn term_query(term: Term) -> Box<dyn Query> {
    Box::new(TermQuery::new(term, IndexRecordOption::Basic))
}

fn term_set_query(field: Field, ids: &[u64]) -> Box<dyn Query> {
    Box::new(TermSetQuery::new(
        ids.iter().map(|id| Term::from_field_u64(field, *id)),
    ))
}
