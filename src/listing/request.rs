//! Listing request model and HTTP parameter parsing

use crate::config::ListingConfig;
use crate::listing::error::ValidationError;
use crate::models::ActorContext;
use crate::search::{SearchSort, SortField, SortOrder, MATCH_ALL};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Optional typed filters of a listing request
///
/// Every field defaults to unset. Unset boolean flags leave the attribute
/// unconstrained; `Some(false)` is an explicit constraint. Identity lists hold
/// the raw caller values and are normalized when the filter set is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilters {
    pub admin: Option<bool>,
    pub chat: Option<bool>,
    pub on_duty: Option<bool>,
    pub report: Option<bool>,
    pub general_team: Option<bool>,

    /// Only these accounts; overrides `non_account_ids`
    pub account_ids: Option<Vec<String>>,

    /// Everything except these accounts
    pub non_account_ids: Option<Vec<String>>,

    /// Accounts belonging to any of these teams
    pub team_ids: Option<Vec<String>>,

    /// Rank by relevance with `accounts_boosted` first
    pub account_sorted: bool,

    /// Accounts ranked ahead of all others
    pub accounts_boosted: Option<Vec<String>>,
}

/// Explicit ordering requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

impl From<SortSpec> for SearchSort {
    fn from(spec: SortSpec) -> Self {
        SearchSort::Field(spec.field, spec.order)
    }
}

/// Validated, immutable account listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    actor: ActorContext,
    q: String,
    page: u32,
    per_page: u32,
    filters: ListingFilters,
    sort: Option<SortSpec>,
}

impl ListingRequest {
    pub fn builder(actor: ActorContext) -> ListingRequestBuilder {
        ListingRequestBuilder::new(actor)
    }

    pub fn actor(&self) -> &ActorContext {
        &self.actor
    }

    /// Free-text query, `*` when the caller sent none
    pub fn query(&self) -> &str {
        &self.q
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn filters(&self) -> &ListingFilters {
        &self.filters
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }
}

/// Builder for [`ListingRequest`]; `build` enforces the pagination and query bounds
#[derive(Debug, Clone)]
pub struct ListingRequestBuilder {
    actor: ActorContext,
    q: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
    filters: ListingFilters,
    sort: Option<SortSpec>,
}

impl ListingRequestBuilder {
    pub fn new(actor: ActorContext) -> Self {
        Self {
            actor,
            q: None,
            page: None,
            per_page: None,
            filters: ListingFilters::default(),
            sort: None,
        }
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn filters(mut self, filters: ListingFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn build(self, config: &ListingConfig) -> Result<ListingRequest, ValidationError> {
        let q = match self.q {
            Some(q) if !q.trim().is_empty() => q.trim().to_string(),
            _ => MATCH_ALL.to_string(),
        };
        if q.chars().count() > config.max_query_length {
            return Err(ValidationError::new(
                "q",
                format!("must be at most {} characters", config.max_query_length),
            ));
        }

        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(ValidationError::new("page", "must be at least 1"));
        }

        let per_page = self.per_page.unwrap_or(config.default_per_page);
        if per_page < 1 || per_page > config.max_per_page {
            return Err(ValidationError::new(
                "per_page",
                format!("must be between 1 and {}", config.max_per_page),
            ));
        }

        Ok(ListingRequest {
            actor: self.actor,
            q,
            page,
            per_page,
            filters: self.filters,
            sort: self.sort,
        })
    }
}

/// Raw query-string parameters of the listing endpoint
///
/// List parameters are comma separated. Flags accept `true|false|1|0`; an
/// empty value means unset.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListingParams {
    #[validate(length(max = 256))]
    pub q: Option<String>,

    /// 1-based page number
    pub page: Option<String>,

    pub per_page: Option<String>,

    pub admin: Option<String>,
    pub chat: Option<String>,
    pub on_duty: Option<String>,
    pub report: Option<String>,
    pub general_team: Option<String>,

    pub account_ids: Option<String>,
    pub non_account_ids: Option<String>,
    pub team_ids: Option<String>,

    pub account_sorted: Option<String>,
    pub accounts_boosted: Option<String>,

    /// Sort field name
    pub sort: Option<String>,

    /// `asc` or `desc`, descending when omitted
    pub order: Option<String>,
}

impl ListingParams {
    /// Convert into a validated request for the given actor
    pub fn into_request(
        self,
        actor: ActorContext,
        config: &ListingConfig,
    ) -> Result<ListingRequest, ValidationError> {
        let filters = ListingFilters {
            admin: parse_flag("admin", self.admin.as_deref())?,
            chat: parse_flag("chat", self.chat.as_deref())?,
            on_duty: parse_flag("on_duty", self.on_duty.as_deref())?,
            report: parse_flag("report", self.report.as_deref())?,
            general_team: parse_flag("general_team", self.general_team.as_deref())?,
            account_ids: split_list(self.account_ids.as_deref()),
            non_account_ids: split_list(self.non_account_ids.as_deref()),
            team_ids: split_list(self.team_ids.as_deref()),
            account_sorted: parse_flag("account_sorted", self.account_sorted.as_deref())?
                .unwrap_or(false),
            accounts_boosted: split_list(self.accounts_boosted.as_deref()),
        };

        let mut builder = ListingRequest::builder(actor).filters(filters);

        if let Some(q) = self.q {
            builder = builder.query(q);
        }
        if let Some(page) = parse_count("page", self.page.as_deref())? {
            builder = builder.page(page);
        }
        if let Some(per_page) = parse_count("per_page", self.per_page.as_deref())? {
            builder = builder.per_page(per_page);
        }
        if let Some(sort) = parse_sort(self.sort.as_deref(), self.order.as_deref())? {
            builder = builder.sort(sort);
        }

        builder.build(config)
    }
}

/// Parse an optional boolean flag; blank means unset
pub fn parse_flag(field: &str, raw: Option<&str>) -> Result<Option<bool>, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        other => Err(ValidationError::new(
            field,
            format!("'{}' is not a boolean", other),
        )),
    }
}

/// Parse an optional page number or size; blank means unset
pub fn parse_count(field: &str, raw: Option<&str>) -> Result<Option<u32>, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| ValidationError::new(field, format!("'{}' is not a positive integer", raw)))
}

/// Split a comma separated list; blank input means unset
pub fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    let items: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn parse_sort(field: Option<&str>, order: Option<&str>) -> Result<Option<SortSpec>, ValidationError> {
    let Some(field) = field.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let field = field
        .parse::<SortField>()
        .map_err(|_| ValidationError::new("sort", format!("unknown sort field '{}'", field)))?;

    let order = match order.map(str::trim).filter(|v| !v.is_empty()) {
        Some(order) => order
            .parse::<SortOrder>()
            .map_err(|_| ValidationError::new("order", format!("unknown sort order '{}'", order)))?,
        None => SortOrder::Descending,
    };

    Ok(Some(SortSpec::new(field, order)))
}
