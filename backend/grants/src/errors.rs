//! Application-wide error types.

use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum GrantError {
    #[error("grant not found: {0}")]
    NotFound(String),

    #[error("grant already exists: {0}")]
    Conflict(String),

    #[error("Ledger codec error: {0}")]
    Codec(#[from] LedgerError),

    #[error("Database error: {0}")]
    Io(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("invalid grant status: {0:?} (expected \"open\" or \"closed\")")]
    InvalidStatus(String),

    #[error("stored grant {grant_id} is corrupt: {reason}")]
    CorruptRecord { grant_id: String, reason: String },

    #[error("grant id must not be empty")]
    EmptyGrantId,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GrantError {
    /// Classify a failed insert: primary-key violations become [`GrantError::Conflict`].
    pub fn from_insert(err: sqlx::Error, grant_id: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(grant_id.to_string())
            }
            _ => Self::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrantError>;
