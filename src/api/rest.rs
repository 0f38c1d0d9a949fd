// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. This layer only translates between
// HTTP and the indicator service; no indicator logic lives here.
//
// CORS is permissive: the dashboard is served from a different origin during
// development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::app_state::AppState;
use crate::error::IndicatorError;
use crate::runtime_config::CacheTtls;
use crate::types::EntityKind;

// =============================================================================
// Router construction
// =============================================================================

/// Build the REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/indicators/:symbol", get(indicators))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct TtlSeconds {
    quote: u64,
    indicators: u64,
    news: u64,
    recommendation: u64,
    historical: u64,
}

impl From<&CacheTtls> for TtlSeconds {
    fn from(ttl: &CacheTtls) -> Self {
        let secs = |kind| ttl.for_kind(kind).as_secs();
        Self {
            quote: secs(EntityKind::Quote),
            indicators: secs(EntityKind::Indicators),
            news: secs(EntityKind::News),
            recommendation: secs(EntityKind::Recommendation),
            historical: secs(EntityKind::Historical),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    cached_snapshots: usize,
    refresh_count: u64,
    requests_served: u64,
    server_time: i64,
    ttl_secs: TtlSeconds,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        cached_snapshots: state.indicators.cached_snapshots(),
        refresh_count: state.indicators.refresh_count(),
        requests_served: state
            .requests_served
            .load(std::sync::atomic::Ordering::Relaxed),
        server_time: chrono::Utc::now().timestamp_millis(),
        ttl_secs: TtlSeconds::from(&state.config.cache_ttl),
    };
    Json(resp)
}

// =============================================================================
// Indicators
// =============================================================================

async fn indicators(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    state.record_request();

    match state.indicators.get_indicators(&symbol).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            let status = match e {
                IndicatorError::InsufficientData { .. } => StatusCode::NOT_FOUND,
                IndicatorError::EmptySeries => StatusCode::UNPROCESSABLE_ENTITY,
            };
            warn!(symbol = %symbol, error = %e, "indicator request failed");
            let body = serde_json::json!({ "error": e.to_string(), "symbol": symbol });
            (status, Json(body)).into_response()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Clock, SystemClock};
    use crate::market_data::HistoricalBars;
    use crate::runtime_config::ServiceConfig;
    use crate::types::{PriceBar, Timeframe};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use tower::ServiceExt;

    /// Serves a rising month of bars for every symbol except `MISSING`.
    struct StubHistory;

    #[async_trait]
    impl HistoricalBars for StubHistory {
        async fn fetch_historical_bars(&self, symbol: &str, _tf: Timeframe) -> Vec<PriceBar> {
            if symbol == "MISSING" {
                return Vec::new();
            }
            let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
            (0..21)
                .map(|i| {
                    let close = 50.0 + i as f64;
                    PriceBar {
                        date: start + chrono::Days::new(i),
                        open: close,
                        high: close,
                        low: close,
                        close,
                        volume: 1.0,
                    }
                })
                .collect()
        }
    }

    fn app() -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::with_source(
            ServiceConfig::default(),
            Arc::new(SystemClock) as Arc<dyn Clock>,
            StubHistory,
        ));
        (state.clone(), router(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn indicators_returns_snapshot() {
        let (state, app) = app();

        let (status, body) = get_json(app, "/api/v1/indicators/aapl").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "AAPL");
        assert_eq!(body["rsi"], 100.0);
        assert!(body["movingAverages"]["ma20"].as_f64().unwrap() > 50.0);
        assert!(body["bollingerBands"]["upper"].as_f64().unwrap() > body["bollingerBands"]["lower"].as_f64().unwrap());
        assert_eq!(state.indicators.refresh_count(), 1);
    }

    #[tokio::test]
    async fn indicators_without_bars_is_404() {
        let (_, app) = app();

        let (status, body) = get_json(app, "/api/v1/indicators/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["symbol"], "missing");
        assert!(body["error"].as_str().unwrap().contains("insufficient data"));
    }

    #[tokio::test]
    async fn encoded_path_symbol_is_rejected() {
        let (state, app) = app();

        let (status, body) =
            get_json(app, "/api/v1/indicators/..%2F..%2Fv7%2Ffinance%2Fquote").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["symbol"], "../../v7/finance/quote");
        assert_eq!(state.indicators.refresh_count(), 0);
        assert_eq!(state.indicators.cached_snapshots(), 0);
    }

    #[tokio::test]
    async fn health_reports_cache_state_and_ttls() {
        let (state, app) = app();
        state.indicators.get_indicators("MSFT").await.unwrap();

        let (status, body) = get_json(app, "/api/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cached_snapshots"], 1);
        assert_eq!(body["refresh_count"], 1);
        assert_eq!(body["ttl_secs"]["indicators"], 300);
        assert_eq!(body["ttl_secs"]["recommendation"], 3600);
    }

    #[tokio::test]
    async fn repeated_requests_hit_cache() {
        let (state, app) = app();

        get_json(app.clone(), "/api/v1/indicators/TSLA").await;
        get_json(app, "/api/v1/indicators/tsla").await;

        assert_eq!(state.indicators.refresh_count(), 1);
        assert_eq!(state.requests_served.load(std::sync::atomic::Ordering::Relaxed), 2);
    }
}
