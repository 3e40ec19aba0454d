//! Application configuration loaded from environment variables.

use crate::errors::{GrantError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Path or `sqlite:` URL of the grants database
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Size of the SQLite connection pool
    pub max_connections: u32,
    /// Number of demo grants to insert at startup (0 disables seeding)
    pub seed_demo_grants: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            database_url: var("DATABASE_URL", "sqlite:./grants.db"),
            api_port: var("API_PORT", "8080")
                .parse()
                .map_err(|_| GrantError::Config("Invalid API_PORT".to_string()))?,
            max_connections: var("DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| GrantError::Config("Invalid DB_MAX_CONNECTIONS".to_string()))?,
            seed_demo_grants: var("SEED_DEMO_GRANTS", "0")
                .parse()
                .map_err(|_| GrantError::Config("Invalid SEED_DEMO_GRANTS".to_string()))?,
        })
    }
}
