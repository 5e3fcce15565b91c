//! Structured filter set applied to account searches

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Constraint applied to a single indexed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    /// Field equals the boolean
    Bool(bool),

    /// Field equals the identifier
    Eq(u64),

    /// Field matches any of the identifiers
    AnyOf(Vec<u64>),

    /// Field matches none of the identifiers
    NotIn(Vec<u64>),
}

/// Mapping from field name to constraint
///
/// Absent fields are unconstrained; they never mean `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    filters: BTreeMap<String, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the constraint for a field, replacing any previous one
    pub fn insert(&mut self, field: impl Into<String>, value: FilterValue) {
        self.filters.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.filters.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.filters.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.filters.iter()
    }
}

/// Entities ranked ahead of all others
///
/// Presence of a boost disables explicit ordering for the rest of the results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostSpec {
    pub ids: Vec<u64>,
}

impl BoostSpec {
    pub fn new(ids: Vec<u64>) -> Self {
        Self { ids }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }
}
