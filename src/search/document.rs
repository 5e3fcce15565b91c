//! Search document structures and indexing

use crate::models::Account;
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::SortField;
use serde::{Deserialize, Serialize};
use tantivy::schema::*;
use tantivy::TantivyDocument;

/// Fields matched by the free-text query
pub const SEARCH_FIELDS: [&str; 2] = ["first_name", "last_name"];

/// Stored copy of the full search data, returned with each hit
const SOURCE_FIELD: &str = "source";

/// Fast field an ordering is read from
///
/// Names sort case-insensitively from lowercased copies of the text fields.
pub fn sort_field_name(field: SortField) -> &'static str {
    match field {
        SortField::Id => "id",
        SortField::FirstName => "first_name_sort",
        SortField::LastName => "last_name_sort",
        SortField::Score => "score",
        SortField::Limit => "limit",
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
    }
}

/// Trait for documents that can be indexed and searched
pub trait SearchDocument {
    /// Convert to Tantivy document
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument;

    /// Get document ID
    fn document_id(&self) -> u64;
}

/// Account projection stored in the search index
///
/// Only directory attributes are indexed; credentials and tokens never are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDocument {
    pub account: Account,
}

impl From<&Account> for AccountDocument {
    fn from(account: &Account) -> Self {
        Self {
            account: account.clone(),
        }
    }
}

impl From<Account> for AccountDocument {
    fn from(account: Account) -> Self {
        Self { account }
    }
}

impl SearchDocument for AccountDocument {
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument {
        let account = &self.account;
        let mut doc = TantivyDocument::new();

        for (name, value) in [("id", account.id), ("company_id", account.company_id)] {
            if let Ok(field) = schema.get_field(name) {
                doc.add_u64(field, value);
            }
        }

        if let Ok(field) = schema.get_field("first_name") {
            doc.add_text(field, &account.first_name);
        }
        if let Ok(field) = schema.get_field("last_name") {
            doc.add_text(field, &account.last_name);
        }
        for (sort_field, name) in [
            (SortField::FirstName, &account.first_name),
            (SortField::LastName, &account.last_name),
        ] {
            if let Ok(field) = schema.get_field(sort_field_name(sort_field)) {
                doc.add_text(field, name.to_lowercase());
            }
        }
        if let Ok(field) = schema.get_field("email") {
            doc.add_text(field, &account.email);
        }

        // Boolean flags
        for (name, value) in [
            ("admin", account.admin),
            ("chat", account.chat),
            ("report", account.report),
            ("general_team", account.general_team),
            ("on_duty", account.on_duty),
        ] {
            if let Ok(field) = schema.get_field(name) {
                doc.add_bool(field, value);
            }
        }

        // Numeric attributes backing the facets
        if let Ok(field) = schema.get_field("score") {
            doc.add_u64(field, account.score);
        }
        if let Ok(field) = schema.get_field("limit") {
            doc.add_u64(field, account.limit);
        }

        // Teams (multi-valued)
        if let Ok(field) = schema.get_field("team_ids") {
            for team_id in &account.team_ids {
                doc.add_u64(field, *team_id);
            }
        }

        if let Ok(field) = schema.get_field("created_at") {
            doc.add_date(
                field,
                tantivy::DateTime::from_timestamp_secs(account.created_at.timestamp()),
            );
        }
        if let Ok(field) = schema.get_field("updated_at") {
            doc.add_date(
                field,
                tantivy::DateTime::from_timestamp_secs(account.updated_at.timestamp()),
            );
        }

        if let Ok(field) = schema.get_field(SOURCE_FIELD) {
            if let Ok(source) = serde_json::to_string(account) {
                doc.add_text(field, source);
            }
        }

        doc
    }

    fn document_id(&self) -> u64 {
        self.account.id
    }
}

/// Decode the stored account from a retrieved document
pub fn account_from_doc(doc: &TantivyDocument, schema: &Schema) -> SearchResult<Account> {
    let field = schema
        .get_field(SOURCE_FIELD)
        .map_err(|e| SearchError::IndexCorruption(format!("Missing source field: {}", e)))?;

    let source = doc
        .get_first(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SearchError::IndexCorruption("Document without source".to_string()))?;

    serde_json::from_str(source)
        .map_err(|e| SearchError::IndexCorruption(format!("Undecodable source: {}", e)))
}

/// Build the search schema for accounts
pub fn build_account_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    // Identity and tenant - exact match filters
    schema_builder.add_u64_field("id", INDEXED | STORED | FAST);
    schema_builder.add_u64_field("company_id", INDEXED | STORED | FAST);

    // Names - full-text indexed
    schema_builder.add_text_field("first_name", TEXT | STORED);
    schema_builder.add_text_field("last_name", TEXT | STORED);

    // Name ordering - lowercased, untokenized
    schema_builder.add_text_field("first_name_sort", STRING | FAST);
    schema_builder.add_text_field("last_name_sort", STRING | FAST);

    schema_builder.add_text_field("email", STRING | STORED);

    // Boolean flags
    schema_builder.add_bool_field("admin", INDEXED | STORED);
    schema_builder.add_bool_field("chat", INDEXED | STORED);
    schema_builder.add_bool_field("report", INDEXED | STORED);
    schema_builder.add_bool_field("general_team", INDEXED | STORED);
    schema_builder.add_bool_field("on_duty", INDEXED | STORED);

    // Facet sources
    schema_builder.add_u64_field("score", INDEXED | STORED | FAST);
    schema_builder.add_u64_field("limit", INDEXED | STORED | FAST);

    // Team membership - multi-valued
    schema_builder.add_u64_field("team_ids", INDEXED | STORED);

    schema_builder.add_date_field("created_at", INDEXED | STORED | FAST);
    schema_builder.add_date_field("updated_at", INDEXED | STORED | FAST);

    schema_builder.add_text_field(SOURCE_FIELD, STORED);

    schema_builder.build()
}
