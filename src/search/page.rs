//! Paginated search results

use crate::models::Account;
use crate::search::aggregation::FacetResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Pagination window over a full match set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total_count: u64,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total_count: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            total_count,
        }
    }

    /// Number of pages needed for the full match set
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(self.per_page as u64)
    }

    /// Whether a page exists after this one
    pub fn has_next_page(&self) -> bool {
        self.total_count > self.page as u64 * self.per_page as u64
    }

    /// Slice of `len` ranked items belonging to this page
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = ((self.page as u64 - 1) * self.per_page as u64).min(len as u64) as usize;
        let end = (start + self.per_page as usize).min(len);
        start..end
    }
}

/// One page of an account listing
///
/// Built once per request and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPage {
    /// Accounts on this page, in ranked order
    pub accounts: Vec<Account>,

    /// Whether a subsequent page exists
    pub next_page: bool,

    /// Pages in the full match set
    pub total_pages: u64,

    /// Matches in the full match set
    pub total_count: u64,

    /// Query latency in milliseconds
    pub took: u64,

    /// Facet buckets over the full match set
    pub aggs: BTreeMap<String, FacetResult>,
}

impl ResultPage {
    /// Assemble a page from the accounts inside the pagination window
    pub fn assemble(
        accounts: Vec<Account>,
        pagination: Pagination,
        aggs: BTreeMap<String, FacetResult>,
        took: u64,
    ) -> Self {
        Self {
            accounts,
            next_page: pagination.has_next_page(),
            total_pages: pagination.total_pages(),
            total_count: pagination.total_count,
            took,
            aggs,
        }
    }

    /// Ids of the accounts on this page, in order
    pub fn account_ids(&self) -> Vec<u64> {
        self.accounts.iter().map(|a| a.id).collect()
    }
}
