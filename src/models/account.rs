use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A helpdesk account (agent or staff member) belonging to a company
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// Account identifier
    pub id: u64,

    /// Owning company (tenant)
    pub company_id: u64,

    pub first_name: String,

    pub last_name: String,

    /// Login email of the linked user
    #[serde(default)]
    pub email: String,

    /// Company administrator
    #[serde(default)]
    pub admin: bool,

    /// Chat enabled for this account
    #[serde(default)]
    pub chat: bool,

    /// Access to reports
    #[serde(default)]
    pub report: bool,

    /// Member of the general support team
    #[serde(default)]
    pub general_team: bool,

    /// Currently on duty
    #[serde(default)]
    pub on_duty: bool,

    /// Rating score
    #[serde(default)]
    pub score: u64,

    /// Concurrent ticket load limit
    #[serde(default)]
    pub limit: u64,

    /// Teams the account belongs to
    #[serde(default)]
    pub team_ids: Vec<u64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with default flags
    pub fn new(id: u64, company_id: u64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            company_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: String::new(),
            admin: false,
            chat: false,
            report: false,
            general_team: false,
            on_duty: false,
            score: 0,
            limit: 0,
            team_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Full display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Builder-style setter for the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Builder-style setter for the numeric attributes used by facets
    pub fn with_scores(mut self, score: u64, limit: u64) -> Self {
        self.score = score;
        self.limit = limit;
        self
    }

    /// Builder-style setter for team membership
    pub fn with_teams(mut self, team_ids: Vec<u64>) -> Self {
        self.team_ids = team_ids;
        self
    }
}

/// Explicit identity of the caller of an operation
///
/// Every operation receives this instead of looking up a "current account".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorContext {
    /// Requesting account
    pub account_id: u64,

    /// Tenant the requesting account belongs to
    pub company_id: u64,
}

impl ActorContext {
    pub fn new(account_id: u64, company_id: u64) -> Self {
        Self {
            account_id,
            company_id,
        }
    }
}
