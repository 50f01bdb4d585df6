//! shopgate server binary.
//!
//! A caching gateway in front of a built web-app shell: serves shell
//! resources cache-first with manifest-driven upgrades, and exposes the
//! affiliate product-query endpoint.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use shopgate_core::{AppConfig, StoreDb};

mod error;
mod handlers;
mod routes;
mod state;
mod sync;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!("configuration loaded, binding {}", config.bind_addr);

    let db = StoreDb::open(&config.db_path).await?;
    let state = Arc::new(state::AppState::new(config, db)?);

    // The products endpoint must come up even when the shell origin is
    // unreachable; a failed startup sync leaves the caches to be rebuilt
    // lazily by the asset layer.
    if state.manifest.resources.is_empty() {
        tracing::warn!("resource manifest is empty; asset interception disabled");
    } else if let Err(e) = sync::install_and_activate(&state).await {
        tracing::warn!("startup asset sync failed: {e}");
    }

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    tracing::info!("listening on {}", state.config.bind_addr);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
    }
    tracing::info!("shutdown signal received");
}
