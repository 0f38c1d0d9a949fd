// =============================================================================
// Chart API client — daily bars over HTTP
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?range={range}&interval=1d
//
// Response shape (abridged):
//   { "chart": {
//       "result": [ {
//         "meta": { "gmtoffset": -14400, ... },
//         "timestamp": [1717421400, ...],
//         "indicators": { "quote": [ {
//           "open": [..], "high": [..], "low": [..], "close": [..], "volume": [..]
//         } ] }
//       } ],
//       "error": null } }
//
// The symbol is always pushed as a single percent-encoded path segment, so a
// `/`, `?` or `#` in it cannot reach another endpoint or add query parameters.
//
// Individual points may be null (halts, partial sessions). A point without a
// close is dropped; missing open/high/low fall back to the close.
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::history::{normalize_bars, HistoricalBars};
use crate::types::{PriceBar, Timeframe};

/// HTTP client for the chart endpoint of the quote provider.
#[derive(Clone)]
pub struct YahooChartClient {
    base_url: Url,
    client: reqwest::Client,
}

impl YahooChartClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("invalid chart base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("chart base URL '{base_url}' cannot carry a path");
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stocklens/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        debug!(base_url = %base_url, "chart client initialised");

        Ok(Self { base_url, client })
    }

    /// `{base}/v8/finance/chart/{symbol}?range=..&interval=1d`.
    pub fn chart_url(&self, symbol: &str, timeframe: Timeframe) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("chart base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart"])
            .push(symbol);
        url.query_pairs_mut()
            .clear()
            .append_pair("range", timeframe.range())
            .append_pair("interval", "1d");
        Ok(url)
    }

    /// Fetch daily bars for `symbol` covering `timeframe`.
    #[instrument(skip(self), name = "chart::get_daily_bars")]
    pub async fn get_daily_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<PriceBar>> {
        let url = self.chart_url(symbol, timeframe)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol} failed"))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {symbol}"))?;

        if !status.is_success() {
            anyhow::bail!("chart endpoint returned {} for {}: {}", status, symbol, body);
        }

        let bars = parse_chart(&body)?;
        debug!(symbol, %timeframe, count = bars.len(), "daily bars fetched");
        Ok(bars)
    }
}

#[async_trait]
impl HistoricalBars for YahooChartClient {
    async fn fetch_historical_bars(&self, symbol: &str, timeframe: Timeframe) -> Vec<PriceBar> {
        match self.get_daily_bars(symbol, timeframe).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol, %timeframe, error = %e, "historical bars fetch failed");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for YahooChartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooChartClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Convert a chart response body into normalized daily bars.
pub fn parse_chart(body: &Value) -> Result<Vec<PriceBar>> {
    let chart = body.get("chart").context("chart response missing 'chart'")?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let description = err["description"].as_str().unwrap_or("unknown error");
        anyhow::bail!("chart error: {description}");
    }

    let result = chart["result"]
        .as_array()
        .and_then(|r| r.first())
        .context("chart response has no result")?;

    let Some(timestamps) = result["timestamp"].as_array() else {
        return Ok(Vec::new());
    };

    let gmt_offset = result["meta"]["gmtoffset"].as_i64().unwrap_or(0);
    let quote = &result["indicators"]["quote"][0];
    let series = |field: &str, i: usize| quote[field].get(i).and_then(Value::as_f64);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(ts) = ts.as_i64() else {
            warn!(index = i, "skipping chart point with non-integer timestamp");
            continue;
        };
        let Some(close) = series("close", i).filter(|c| c.is_finite()) else {
            continue;
        };
        let Some(date) = ts
            .checked_add(gmt_offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .map(|d| d.date_naive())
        else {
            warn!(ts, "skipping chart point with out-of-range timestamp");
            continue;
        };

        bars.push(PriceBar {
            date,
            open: series("open", i).unwrap_or(close),
            high: series("high", i).unwrap_or(close),
            low: series("low", i).unwrap_or(close),
            close,
            volume: series("volume", i).unwrap_or(0.0).max(0.0),
        });
    }

    Ok(normalize_bars(bars))
}
