// =============================================================================
// Indicator Refresh — lazy, TTL-driven recomputation per symbol
// =============================================================================
//
// get_indicators(symbol):
//   1. Look up (Indicators, symbol) in the cache.
//   2. Fresh entry => return it as is. No fetch, no recompute.
//   3. Otherwise fetch the lookback window of daily bars, compute a new
//      snapshot, store it and return it.
//
// There is no background refresh and no request coalescing. N concurrent
// callers that all find a stale entry each fetch and recompute; the last write
// wins. Every write is a pure function of the same upstream data, so the race
// only costs duplicated work.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheKey, Clock, TimeKeyedCache};
use crate::error::{IndicatorError, IndicatorResult};
use crate::market_data::HistoricalBars;
use crate::snapshot::{compute_indicators, IndicatorSnapshot};
use crate::types::{EntityKind, Timeframe};

/// Serves indicator snapshots from the cache, recomputing them when stale.
pub struct IndicatorService {
    cache: Arc<dyn TimeKeyedCache<IndicatorSnapshot>>,
    history: Arc<dyn HistoricalBars>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    lookback: Timeframe,
    refreshes: AtomicU64,
}

impl IndicatorService {
    pub fn new(
        cache: Arc<dyn TimeKeyedCache<IndicatorSnapshot>>,
        history: Arc<dyn HistoricalBars>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        lookback: Timeframe,
    ) -> Self {
        Self {
            cache,
            history,
            clock,
            ttl,
            lookback,
            refreshes: AtomicU64::new(0),
        }
    }

    /// Current indicator snapshot for `symbol` (case-insensitive).
    ///
    /// Fails with `InsufficientData` when no bars can be obtained.
    pub async fn get_indicators(&self, symbol: &str) -> IndicatorResult<IndicatorSnapshot> {
        let symbol = normalize_symbol(symbol);
        if !is_ticker(&symbol) {
            debug!(symbol = %symbol, "rejecting malformed symbol");
            return Err(IndicatorError::InsufficientData { symbol });
        }

        let key = CacheKey::new(EntityKind::Indicators, symbol.clone());

        if !self.cache.is_stale(&key, self.ttl) {
            if let Some(entry) = self.cache.get(&key) {
                let age_ms = (self.clock.now() - entry.stored_at).num_milliseconds();
                debug!(symbol = %symbol, age_ms, "indicator cache hit");
                return Ok(entry.value);
            }
        }

        let bars = self.history.fetch_historical_bars(&symbol, self.lookback).await;
        if bars.is_empty() {
            warn!(symbol = %symbol, lookback = %self.lookback, "no bars available for indicators");
            return Err(IndicatorError::InsufficientData { symbol });
        }

        let snapshot = compute_indicators(&symbol, &bars, self.clock.now())?;
        self.cache.set(key, snapshot.clone());
        let refreshes = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            symbol = %symbol,
            bars = bars.len(),
            rsi = format!("{:.2}", snapshot.rsi),
            refreshes,
            "indicators recomputed"
        );

        Ok(snapshot)
    }

    /// Number of recomputations performed since startup.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Number of symbols with a cached snapshot (fresh or not).
    pub fn cached_snapshots(&self) -> usize {
        self.cache.len()
    }
}

/// Trim and upper-case a ticker so `aapl` and `AAPL ` share a cache entry.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Longest ticker accepted from callers.
const MAX_SYMBOL_LEN: usize = 16;

/// `[A-Z0-9.^=-]{1,16}`: plain tickers plus index (`^GSPC`), FX (`EURUSD=X`)
/// and share-class (`BRK-B`, `BRK.B`) forms.
fn is_ticker(symbol: &str) -> bool {
    (1..=MAX_SYMBOL_LEN).contains(&symbol.len())
        && symbol.chars().all(|c| {
            c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-')
        })
}
