// =============================================================================
// Relative Strength Index (RSI) — trailing-window averages
// =============================================================================
//
// Step 1 — Compute day-over-day deltas from consecutive closes.
// Step 2 — Keep the last `period` deltas.
// Step 3 — avg_gain = mean of the positive deltas in the window
//          avg_loss = mean of |negative deltas| in the window
//          Each mean is taken over the deltas of that sign only, and is 0 when
//          there are none. Zero deltas count towards neither side.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// This is a plain window average, not Wilder's smoothing.
// =============================================================================

/// Look-back used by the snapshot.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Value reported when the window is too short or shows no movement at all.
pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI of the last `period` deltas of `closes`, always in `[0, 100]`.
///
/// # Edge cases
/// - fewer than `period + 1` closes, or `period == 0` => [`NEUTRAL_RSI`]
/// - no gains and no losses (flat window) => [`NEUTRAL_RSI`]
/// - losses absent, gains present => 100
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() <= period {
        return NEUTRAL_RSI;
    }

    let window = &closes[closes.len() - period - 1..];

    let (mut gain_sum, mut gain_count) = (0.0_f64, 0_usize);
    let (mut loss_sum, mut loss_count) = (0.0_f64, 0_usize);
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gain_sum += delta;
            gain_count += 1;
        } else if delta < 0.0 {
            loss_sum += delta.abs();
            loss_count += 1;
        }
    }

    let avg_gain = mean_or_zero(gain_sum, gain_count);
    let avg_loss = mean_or_zero(loss_sum, loss_count);

    rsi_from_averages(avg_gain, avg_loss)
}

// =============================================================================
// Internal helpers
// =============================================================================

fn mean_or_zero(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return NEUTRAL_RSI;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        NEUTRAL_RSI
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input_is_neutral() {
        assert_eq!(rsi(&[], DEFAULT_RSI_PERIOD), NEUTRAL_RSI);
    }

    #[test]
    fn rsi_period_zero_is_neutral() {
        assert_eq!(rsi(&[1.0, 2.0, 3.0], 0), NEUTRAL_RSI);
    }

    #[test]
    fn rsi_huge_period_is_neutral() {
        assert_eq!(rsi(&[1.0, 2.0, 3.0], usize::MAX), NEUTRAL_RSI);
    }

    #[test]
    fn rsi_short_rising_series_falls_back() {
        // 11 closes < period + 1 = 15, even though every move is a gain.
        let closes: Vec<f64> = (10..=20).map(|x| x as f64).collect();
        assert_eq!(rsi(&closes, DEFAULT_RSI_PERIOD), NEUTRAL_RSI);
    }

    #[test]
    fn rsi_exactly_period_plus_one_is_computed() {
        let closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        assert_eq!(rsi(&closes, DEFAULT_RSI_PERIOD), 100.0);
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        assert!((rsi(&closes, 14) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        assert!(rsi(&closes, 14).abs() < 1e-10);
    }

    #[test]
    fn rsi_flat_market_is_neutral() {
        let closes = vec![100.0; 30];
        assert_eq!(rsi(&closes, 14), NEUTRAL_RSI);
    }

    #[test]
    fn rsi_averages_by_sign_count() {
        // deltas [1, 2, -1, 0]: gains avg 1.5, losses avg 1.0 => RS 1.5 => 60.
        // Dividing by the period instead would give 75.
        let closes = [10.0, 11.0, 13.0, 12.0, 12.0];
        assert!((rsi(&closes, 4) - 60.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_only_uses_trailing_window() {
        // A crash before the window must not leak into the value.
        let mut closes = vec![100.0, 50.0];
        closes.extend((1..=15).map(|x| 50.0 + x as f64));
        assert_eq!(rsi(&closes, 14), 100.0);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for period in 1..closes.len() {
            let v = rsi(&closes, period);
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range for period {period}");
        }
    }
}
