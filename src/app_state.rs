// =============================================================================
// Central Application State — StockLens backend
// =============================================================================
//
// Ties the configuration and the indicator service together for the REST
// layer. Handlers receive it as `Arc<AppState>`.
//
// Thread safety:
//   - The indicator service owns its cache behind a parking_lot::RwLock.
//   - Atomic counter for served requests.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::cache::{Clock, MemoryCache, SystemClock};
use crate::market_data::{CachedHistory, HistoricalBars, YahooChartClient};
use crate::refresh::IndicatorService;
use crate::runtime_config::ServiceConfig;
use crate::snapshot::IndicatorSnapshot;
use crate::types::{EntityKind, PriceBar};

/// Application state shared across all request handlers via `Arc<AppState>`.
pub struct AppState {
    pub config: ServiceConfig,
    pub indicators: IndicatorService,

    /// Indicator requests served since startup (hits and misses).
    pub requests_served: AtomicU64,

    /// Instant the service started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build the production wiring: HTTP chart client behind a bars cache,
    /// feeding an indicator service with its own snapshot cache.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = YahooChartClient::new(
            config.quote_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::with_source(config, Arc::new(SystemClock), client))
    }

    /// Wire the service around an arbitrary bars source and clock.
    pub fn with_source<S>(config: ServiceConfig, clock: Arc<dyn Clock>, source: S) -> Self
    where
        S: HistoricalBars + 'static,
    {
        let bars_cache: Arc<MemoryCache<Vec<PriceBar>>> = Arc::new(MemoryCache::new(clock.clone()));
        let history = CachedHistory::new(
            source,
            bars_cache,
            config.cache_ttl.for_kind(EntityKind::Historical),
        );

        let snapshot_cache: Arc<MemoryCache<IndicatorSnapshot>> =
            Arc::new(MemoryCache::new(clock.clone()));
        let indicators = IndicatorService::new(
            snapshot_cache,
            Arc::new(history),
            clock,
            config.cache_ttl.for_kind(EntityKind::Indicators),
            config.indicator_lookback,
        );

        Self {
            config,
            indicators,
            requests_served: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    /// Count one served indicator request; returns the new total.
    pub fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }
}
