pub mod history;
pub mod yahoo;

pub use history::{CachedHistory, HistoricalBars};
pub use yahoo::YahooChartClient;
