// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The seed is the first close of the series, not the SMA of the first `period`
// closes, and the recurrence runs over the whole slice. The result therefore
// depends on every close supplied, not only on the trailing `period` points.
// Dashboard consumers are calibrated to these numbers; keep the seeding as is.
// =============================================================================

use crate::error::{IndicatorError, IndicatorResult};

/// Compute the EMA path over every close in `closes`.
///
/// The output has the same length as the input; element `i` is the EMA after
/// consuming `closes[..=i]`. Returns an empty `Vec` for an empty input.
pub fn ema_series(closes: &[f64], period: usize) -> Vec<f64> {
    let Some((&first, rest)) = closes.split_first() else {
        return Vec::new();
    };

    let multiplier = 2.0 / (period as f64 + 1.0);

    let mut result = Vec::with_capacity(closes.len());
    result.push(first);

    let mut prev_ema = first;
    for &close in rest {
        prev_ema = close * multiplier + prev_ema * (1.0 - multiplier);
        result.push(prev_ema);
    }

    result
}

/// Most recent EMA value for `closes`.
pub fn ema(closes: &[f64], period: usize) -> IndicatorResult<f64> {
    ema_series(closes, period)
        .last()
        .copied()
        .ok_or(IndicatorError::EmptySeries)
}
