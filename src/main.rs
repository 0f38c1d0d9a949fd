// =============================================================================
// StockLens Backend — Main Entry Point
// =============================================================================
//
// Serves technical-indicator snapshots to the dashboard. Indicators are
// recomputed lazily when a request finds the cached snapshot stale; there are
// no background refresh tasks.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod cache;
mod error;
mod indicators;
mod market_data;
mod refresh;
mod runtime_config;
mod snapshot;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::ServiceConfig;

const CONFIG_PATH: &str = "stocklens.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("StockLens backend starting up");

    let mut config = ServiceConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ServiceConfig::default()
    });
    config.apply_env_overrides();

    info!(
        quote_base_url = %config.quote_base_url,
        lookback = %config.indicator_lookback,
        indicators_ttl_secs = config.cache_ttl.indicators_secs,
        historical_ttl_secs = config.cache_ttl.historical_secs,
        "Indicator service configured"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config)?);

    // ── 3. Serve the API until Ctrl+C ────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => warn!("Shutdown signal received — stopping gracefully"),
                Err(e) => {
                    warn!(error = %e, "Failed to listen for shutdown signal");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
        .context("API server failed")?;

    info!("StockLens backend shut down complete.");
    Ok(())
}
