// =============================================================================
// Shared types used across the StockLens backend
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data.
///
/// Series of bars are ordered ascending by `date` with no duplicate dates;
/// see [`crate::market_data::history::normalize_bars`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Look-back window requested from the historical-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
}

impl Timeframe {
    /// Range parameter understood by the chart endpoint.
    pub fn range(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::OneWeek => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::OneMonth
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
        };
        f.write_str(label)
    }
}

/// Kind of cached entity. Each kind carries its own TTL in
/// [`crate::runtime_config::CacheTtls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Quote,
    Indicators,
    News,
    Recommendation,
    Historical,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quote => write!(f, "quote"),
            Self::Indicators => write!(f, "indicators"),
            Self::News => write!(f, "news"),
            Self::Recommendation => write!(f, "recommendation"),
            Self::Historical => write!(f, "historical"),
        }
    }
}
