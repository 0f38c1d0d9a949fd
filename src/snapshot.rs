// =============================================================================
// Indicator Snapshot — aggregates every series indicator for one symbol
// =============================================================================
//
// Projects the bar series onto its closes and runs each indicator once. The
// result is a pure function of (symbol, bars, computed_at); nothing here
// touches the cache or the network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IndicatorError, IndicatorResult};
use crate::indicators::{
    bollinger_bands, macd, rsi, sma, BollingerBands, MacdLine, DEFAULT_BOLLINGER_PERIOD,
    DEFAULT_RSI_PERIOD,
};
use crate::types::PriceBar;

/// Trailing simple moving averages. Each period is capped at the series length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub ma20: f64,
    pub ma50: f64,
    pub ma200: f64,
}

/// Full indicator set served to the dashboard for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub rsi: f64,
    pub macd: MacdLine,
    pub moving_averages: MovingAverages,
    pub bollinger_bands: BollingerBands,
    pub computed_at: DateTime<Utc>,
}

/// Build an [`IndicatorSnapshot`] for `symbol` from an ascending bar series.
///
/// Fails with `InsufficientData` only when `bars` is empty; short series fall
/// back per indicator (neutral RSI, capped moving-average windows).
pub fn compute_indicators(
    symbol: &str,
    bars: &[PriceBar],
    computed_at: DateTime<Utc>,
) -> IndicatorResult<IndicatorSnapshot> {
    if bars.is_empty() {
        return Err(IndicatorError::InsufficientData {
            symbol: symbol.to_string(),
        });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let snapshot = IndicatorSnapshot {
        symbol: symbol.to_string(),
        rsi: rsi(&closes, DEFAULT_RSI_PERIOD),
        macd: macd(&closes)?,
        moving_averages: MovingAverages {
            ma20: sma(&closes, 20)?,
            ma50: sma(&closes, 50)?,
            ma200: sma(&closes, 200)?,
        },
        bollinger_bands: bollinger_bands(&closes, DEFAULT_BOLLINGER_PERIOD)?,
        computed_at,
    };

    debug!(
        symbol,
        bars = bars.len(),
        rsi = format!("{:.2}", snapshot.rsi),
        macd = format!("{:.4}", snapshot.macd.value),
        "indicator snapshot computed"
    );

    Ok(snapshot)
}
