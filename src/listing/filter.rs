//! Translate listing requests into structured search filters

use crate::listing::error::ValidationError;
use crate::listing::request::ListingRequest;
use crate::search::{BoostSpec, FilterSet, FilterValue};

/// Builds the filter set and boost for a listing request
///
/// Pure and deterministic: no I/O, no ambient state.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryFilterBuilder;

impl QueryFilterBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, request: &ListingRequest) -> Result<FilterSet, ValidationError> {
        let requested = request.filters();
        let mut filters = FilterSet::new();

        let flags = [
            ("admin", requested.admin),
            ("chat", requested.chat),
            ("on_duty", requested.on_duty),
            ("report", requested.report),
            ("general_team", requested.general_team),
        ];
        for (name, value) in flags {
            if let Some(flag) = value {
                filters.insert(name, FilterValue::Bool(flag));
            }
        }

        // Exclusion first so an inclusion list replaces it
        if let Some(ids) = parse_ids("non_account_ids", requested.non_account_ids.as_deref())? {
            filters.insert("id", FilterValue::NotIn(ids));
        }
        if let Some(ids) = parse_ids("account_ids", requested.account_ids.as_deref())? {
            filters.insert("id", FilterValue::AnyOf(ids));
        }

        if let Some(ids) = parse_ids("team_ids", requested.team_ids.as_deref())? {
            filters.insert("team_ids", FilterValue::AnyOf(ids));
        }

        // Tenant scope is inserted last and unconditionally
        filters.insert("company_id", FilterValue::Eq(request.actor().company_id));

        Ok(filters)
    }

    /// Boost derived from `accounts_boosted` and `account_sorted`
    pub fn boost(&self, request: &ListingRequest) -> Result<Option<BoostSpec>, ValidationError> {
        let requested = request.filters();
        let ids = parse_ids("accounts_boosted", requested.accounts_boosted.as_deref())?;

        match ids {
            Some(ids) => Ok(Some(BoostSpec::new(ids))),
            None if requested.account_sorted => Ok(Some(BoostSpec::default())),
            None => Ok(None),
        }
    }
}

/// Normalize raw identifiers; an absent or empty list is unset
fn parse_ids(field: &str, raw: Option<&[String]>) -> Result<Option<Vec<u64>>, ValidationError> {
    let Some(raw) = raw.filter(|values| !values.is_empty()) else {
        return Ok(None);
    };

    raw.iter()
        .map(|value| {
            value.trim().parse::<u64>().map_err(|_| {
                ValidationError::new(field, format!("'{}' is not a valid identifier", value))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
