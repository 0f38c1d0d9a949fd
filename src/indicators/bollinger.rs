// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = SMA of the trailing window, upper/lower = middle ± 2σ where σ
// is the population standard deviation of that same window. The window is
// capped at the series length, like the SMA it is built on.

use serde::{Deserialize, Serialize};

use super::{sma, trailing};
use crate::error::IndicatorResult;

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;

/// Band distance from the middle, in standard deviations.
pub const BAND_STD_MULTIPLIER: f64 = 2.0;

/// Result of a Bollinger Band calculation.
///
/// `lower <= middle <= upper`, with equality only for a zero-variance window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Calculate Bollinger Bands over the last `min(period, closes.len())` closes.
pub fn bollinger_bands(closes: &[f64], period: usize) -> IndicatorResult<BollingerBands> {
    let middle = sma(closes, period)?;
    let window = trailing(closes, period);

    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / window.len() as f64;
    let std_dev = variance.sqrt();

    Ok(BollingerBands {
        upper: middle + BAND_STD_MULTIPLIER * std_dev,
        middle,
        lower: middle - BAND_STD_MULTIPLIER * std_dev,
    })
}
