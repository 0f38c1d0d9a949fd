// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator functions over an ordered slice of closing
// prices. Nothing here holds shared state, so every function is safe to call
// from any number of request handlers at once.
//
// Under-supplied input degrades to a documented value wherever one exists.
// Only the functions with no sensible fallback on an empty slice (`sma`, `ema`,
// `macd`, `bollinger_bands`) return `IndicatorError::EmptySeries`.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{bollinger_bands, BollingerBands, DEFAULT_BOLLINGER_PERIOD};
pub use macd::{macd, MacdLine};
pub use rsi::{rsi, DEFAULT_RSI_PERIOD};
pub use sma::sma;

/// Trailing window of at most `period` closes (never fewer than one element
/// when `closes` is non-empty).
fn trailing(closes: &[f64], period: usize) -> &[f64] {
    let len = period.max(1).min(closes.len());
    &closes[closes.len() - len..]
}
