// =============================================================================
// MACD (Moving Average Convergence Divergence) — fixed-ratio variant
// =============================================================================
//
//   value     = EMA(12) - EMA(26)
//   signal    = 0.8 * value
//   histogram = 0.2 * value
//
// The signal line is NOT a 9-period EMA of the MACD line. Downstream
// recommendation logic is tuned to these fixed fractions, so this is not
// textbook MACD and must not be "corrected" here.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::ema;
use crate::error::IndicatorResult;

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_RATIO: f64 = 0.8;
pub const HISTOGRAM_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdLine {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD of `closes`; fails with `EmptySeries` on an empty slice.
pub fn macd(closes: &[f64]) -> IndicatorResult<MacdLine> {
    let value = ema(closes, FAST_PERIOD)? - ema(closes, SLOW_PERIOD)?;
    Ok(MacdLine {
        value,
        signal: value * SIGNAL_RATIO,
        histogram: value * HISTOGRAM_RATIO,
    })
}
