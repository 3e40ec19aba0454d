//! The grant entity and its lifecycle status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GrantError;
use crate::ledger::Contributions;

/// Lifecycle status of a grant's funding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    /// Accepting contributions.
    Open,
    /// Funding window closed.
    Closed,
}

impl GrantStatus {
    /// Return the identifier stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for GrantStatus {
    type Err = GrantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(GrantError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A funding record: target amount, status, and contribution ledger.
///
/// `grant_amount` is kept as the decimal text the caller supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    #[serde(rename = "grantid")]
    pub grant_id: String,
    pub grant_amount: String,
    pub status: GrantStatus,
    #[serde(rename = "contribution")]
    pub contributions: Contributions,
}

impl Grant {
    /// An open grant with an empty ledger.
    pub fn new(grant_id: impl Into<String>, grant_amount: impl Into<String>) -> Self {
        Self {
            grant_id: grant_id.into(),
            grant_amount: grant_amount.into(),
            status: GrantStatus::Open,
            contributions: Contributions::new(),
        }
    }
}

/// A grant row as stored in / read from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GrantRecord {
    pub grantid: String,
    pub grant_amount: String,
    pub status: String,
    pub contributions: String,
}
