// =============================================================================
// Indicator errors
// =============================================================================
//
// Only two conditions are errors. Every other under-supply case (short RSI
// window, moving-average period longer than the series) degrades to a
// documented value so snapshot consumers always see numeric fields.

/// Failure raised by the indicator engine or the refresh path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    /// An indicator without a fallback was given zero closes.
    #[error("indicator requires at least one close, got an empty series")]
    EmptySeries,

    /// No price bars could be obtained for `symbol`.
    #[error("insufficient data for {symbol}: no price bars available")]
    InsufficientData { symbol: String },
}

pub type IndicatorResult<T> = Result<T, IndicatorError>;
