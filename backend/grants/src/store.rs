//! Grant store — schema, ledger encoding, and lifecycle transitions over SQLite.
//!
//! Every operation is a single SQL statement, so no explicit transactions are
//! used. Concurrent status updates to the same grant are last-writer-wins.

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, error, info};

use crate::errors::{GrantError, Result};
use crate::ledger;
use crate::model::{Grant, GrantRecord, GrantStatus};

/// Handle to the grants database. Cloning shares the same pool.
#[derive(Debug, Clone)]
pub struct GrantStore {
    pool: SqlitePool,
}

impl GrantStore {
    /// Open the store named by `database_url`, routing in-memory URLs to
    /// [`GrantStore::in_memory`].
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self> {
        if is_in_memory_url(database_url) {
            Self::in_memory().await
        } else {
            Self::connect(database_url, max_connections).await
        }
    }

    /// Open (creating if necessary) the database at `database_url` and run
    /// pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let url = normalize_url(database_url);

        let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to one connection that is never reaped.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied successfully");
        Ok(Self { pool })
    }

    /// Release the underlying connections. Call once, after the last request.
    pub async fn close(self) {
        self.pool.close().await;
        info!("Grant store closed");
    }

    // ─────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────

    /// Persist a new grant. Fails with [`GrantError::Conflict`] if the id is taken.
    pub async fn insert_grant(&self, grant: &Grant) -> Result<()> {
        if grant.grant_id.is_empty() {
            return Err(GrantError::EmptyGrantId);
        }
        let contributions = ledger::encode(&grant.contributions)?;

        sqlx::query(
            r#"
            INSERT INTO grants (grantid, grant_amount, status, contributions)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&grant.grant_id)
        .bind(&grant.grant_amount)
        .bind(grant.status.as_str())
        .bind(&contributions)
        .execute(&self.pool)
        .await
        .map_err(|e| GrantError::from_insert(e, &grant.grant_id))?;

        info!(
            grant_id = %grant.grant_id,
            contributors = grant.contributions.len(),
            pledged = grant.contributions.total(),
            "Grant inserted"
        );
        Ok(())
    }

    /// Set the status of an existing grant.
    ///
    /// Existence is taken from the affected-row count: an update that touches
    /// no row is [`GrantError::NotFound`], never success.
    pub async fn update_grant_status(&self, grant_id: &str, status: GrantStatus) -> Result<()> {
        let rows_affected = sqlx::query("UPDATE grants SET status = ?1 WHERE grantid = ?2")
            .bind(status.as_str())
            .bind(grant_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            debug!(grant_id, "Status update matched no grant");
            return Err(GrantError::NotFound(grant_id.to_string()));
        }

        info!(grant_id, %status, "Grant status updated");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────

    /// Fetch one grant with its ledger decoded.
    pub async fn get_grant(&self, grant_id: &str) -> Result<Grant> {
        let record = sqlx::query_as::<_, GrantRecord>(
            r#"
            SELECT grantid, grant_amount, status, contributions
            FROM   grants
            WHERE  grantid = ?1
            "#,
        )
        .bind(grant_id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => decode_record(record),
            None => {
                debug!(grant_id, "Grant not found");
                Err(GrantError::NotFound(grant_id.to_string()))
            }
        }
    }

    /// Fetch every grant, ordered by id. An empty store yields an empty vec.
    pub async fn get_all_grants(&self) -> Result<Vec<Grant>> {
        let records = sqlx::query_as::<_, GrantRecord>(
            r#"
            SELECT grantid, grant_amount, status, contributions
            FROM   grants
            ORDER  BY grantid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(decode_record).collect()
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn normalize_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    }
}

/// True for `:memory:`, `sqlite::memory:` (with or without query
/// parameters) and `mode=memory` URLs.
pub fn is_in_memory_url(database_url: &str) -> bool {
    let url = normalize_url(database_url);
    let rest = url.trim_start_matches("sqlite:").trim_start_matches("//");
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    path == ":memory:" || query.split('&').any(|param| param == "mode=memory")
}

fn decode_record(record: GrantRecord) -> Result<Grant> {
    let contributions = ledger::decode(&record.contributions).map_err(|e| {
        error!(grant_id = %record.grantid, "Stored ledger is corrupt: {e}");
        GrantError::Codec(e)
    })?;
    let status = record.status.parse::<GrantStatus>().map_err(|_| {
        error!(grant_id = %record.grantid, status = %record.status, "Stored status is unknown");
        GrantError::CorruptRecord {
            grant_id: record.grantid.clone(),
            reason: format!("unknown status {:?}", record.status),
        }
    })?;

    Ok(Grant {
        grant_id: record.grantid,
        grant_amount: record.grant_amount,
        status,
        contributions,
    })
}
