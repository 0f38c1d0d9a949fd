// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the trailing `period` closes. When the series is shorter
// than `period` the whole series is averaged instead of failing, so a one-month
// window still yields MA50 / MA200 values.

use super::trailing;
use crate::error::{IndicatorError, IndicatorResult};

/// Mean of the last `min(period, closes.len())` closes.
///
/// A `period` of zero is treated as one.
pub fn sma(closes: &[f64], period: usize) -> IndicatorResult<f64> {
    if closes.is_empty() {
        return Err(IndicatorError::EmptySeries);
    }

    let window = trailing(closes, period);
    Ok(window.iter().sum::<f64>() / window.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_input() {
        assert_eq!(sma(&[], 20), Err(IndicatorError::EmptySeries));
    }

    #[test]
    fn sma_uses_trailing_window() {
        let closes = [1.0, 2.0, 3.0, 4.0];
        assert!((sma(&closes, 2).unwrap() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn sma_period_longer_than_series_is_full_mean() {
        let closes = [1.0, 2.0, 3.0, 4.0];
        let full = sma(&closes, 200).unwrap();
        assert!((full - 2.5).abs() < 1e-12);
        assert_eq!(full, sma(&closes, closes.len()).unwrap());
    }

    #[test]
    fn sma_single_element() {
        assert_eq!(sma(&[42.0], 50).unwrap(), 42.0);
    }
}
