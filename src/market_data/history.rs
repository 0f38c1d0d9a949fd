// =============================================================================
// Historical bars — provider interface and caching wrapper
// =============================================================================
//
// `HistoricalBars` is the only upstream the indicator refresh path depends on.
// Implementations report failure as an empty series; retries and timeouts are
// theirs to handle.
//
// `CachedHistory` keeps the last successful series per (symbol, timeframe)
// under the historical TTL, so a recompute of indicators does not necessarily
// hit the network.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::{CacheKey, TimeKeyedCache};
use crate::types::{EntityKind, PriceBar, Timeframe};

/// Source of daily bars for a symbol.
#[async_trait]
pub trait HistoricalBars: Send + Sync {
    /// Bars ascending by date; empty when nothing could be fetched.
    async fn fetch_historical_bars(&self, symbol: &str, timeframe: Timeframe) -> Vec<PriceBar>;
}

#[async_trait]
impl<T: HistoricalBars + ?Sized> HistoricalBars for Arc<T> {
    async fn fetch_historical_bars(&self, symbol: &str, timeframe: Timeframe) -> Vec<PriceBar> {
        (**self).fetch_historical_bars(symbol, timeframe).await
    }
}

/// Sort bars ascending by date and collapse duplicate dates, keeping the bar
/// that appeared last in the input.
pub fn normalize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.sort_by_key(|b| b.date);

    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

// =============================================================================
// CachedHistory
// =============================================================================

/// Read-through cache in front of another [`HistoricalBars`] source.
pub struct CachedHistory<S> {
    source: S,
    cache: Arc<dyn TimeKeyedCache<Vec<PriceBar>>>,
    ttl: Duration,
}

impl<S: HistoricalBars> CachedHistory<S> {
    pub fn new(source: S, cache: Arc<dyn TimeKeyedCache<Vec<PriceBar>>>, ttl: Duration) -> Self {
        Self { source, cache, ttl }
    }

    fn key(symbol: &str, timeframe: Timeframe) -> CacheKey {
        CacheKey::new(EntityKind::Historical, symbol).with_sub_key(timeframe.to_string())
    }
}

#[async_trait]
impl<S: HistoricalBars> HistoricalBars for CachedHistory<S> {
    async fn fetch_historical_bars(&self, symbol: &str, timeframe: Timeframe) -> Vec<PriceBar> {
        let key = Self::key(symbol, timeframe);

        if !self.cache.is_stale(&key, self.ttl) {
            if let Some(entry) = self.cache.get(&key) {
                debug!(%key, bars = entry.value.len(), "historical bars served from cache");
                return entry.value;
            }
        }

        let bars = self.source.fetch_historical_bars(symbol, timeframe).await;
        if !bars.is_empty() {
            self.cache.set(key, bars.clone());
            return bars;
        }

        // Upstream came back empty: an expired series beats no series.
        match self.cache.get(&key) {
            Some(entry) => {
                warn!(
                    %key,
                    stored_at = %entry.stored_at,
                    "upstream returned no bars — serving expired cached series"
                );
                entry.value
            }
            None => {
                warn!(%key, "upstream returned no bars and nothing is cached");
                Vec::new()
            }
        }
    }
}
