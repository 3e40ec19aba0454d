//! Grant service — entry point.
//!
//! Opens the SQLite grant store, optionally seeds demo grants, and serves
//! the grant REST API until Ctrl-C. The store is closed once the server
//! has drained.

mod api;
mod config;
mod errors;
mod ledger;
mod model;
mod seed;
mod store;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use store::GrantStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let store = GrantStore::open(&config.database_url, config.max_connections).await?;

    if config.seed_demo_grants > 0 {
        seed::seed_demo_grants(&store, config.seed_demo_grants).await?;
    }

    let app = api::build_router(store.clone());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutdown signal received");
        })
        .await?;

    store.close().await;
    Ok(())
}
