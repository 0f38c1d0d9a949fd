// =============================================================================
// Runtime Configuration — service settings and per-entity cache TTLs
// =============================================================================
//
// Loaded once at startup from a JSON file. All fields carry
// `#[serde(default)]` so a partial file (or `{}`) fills in the rest.
//
// TTLs are owned here, by the caller side of the cache, not by the cache.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{EntityKind, Timeframe};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_quote_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_quote_ttl_secs() -> u64 {
    60
}

fn default_indicators_ttl_secs() -> u64 {
    300
}

fn default_news_ttl_secs() -> u64 {
    900
}

fn default_recommendation_ttl_secs() -> u64 {
    3600
}

fn default_historical_ttl_secs() -> u64 {
    300
}

// =============================================================================
// CacheTtls
// =============================================================================

/// Staleness threshold per cached entity kind, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheTtls {
    #[serde(default = "default_quote_ttl_secs")]
    pub quote_secs: u64,

    #[serde(default = "default_indicators_ttl_secs")]
    pub indicators_secs: u64,

    #[serde(default = "default_news_ttl_secs")]
    pub news_secs: u64,

    #[serde(default = "default_recommendation_ttl_secs")]
    pub recommendation_secs: u64,

    /// Daily bars behind the indicators.
    #[serde(default = "default_historical_ttl_secs")]
    pub historical_secs: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            quote_secs: default_quote_ttl_secs(),
            indicators_secs: default_indicators_ttl_secs(),
            news_secs: default_news_ttl_secs(),
            recommendation_secs: default_recommendation_ttl_secs(),
            historical_secs: default_historical_ttl_secs(),
        }
    }
}

impl CacheTtls {
    pub fn for_kind(&self, kind: EntityKind) -> Duration {
        let secs = match kind {
            EntityKind::Quote => self.quote_secs,
            EntityKind::Indicators => self.indicators_secs,
            EntityKind::News => self.news_secs,
            EntityKind::Recommendation => self.recommendation_secs,
            EntityKind::Historical => self.historical_secs,
        };
        Duration::from_secs(secs)
    }
}

// =============================================================================
// ServiceConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the REST API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the chart (historical bars) provider.
    #[serde(default = "default_quote_base_url")]
    pub quote_base_url: String,

    /// Per-request timeout for the provider HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Bars window requested when indicators are recomputed.
    #[serde(default)]
    pub indicator_lookback: Timeframe,

    #[serde(default)]
    pub cache_ttl: CacheTtls,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            quote_base_url: default_quote_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            indicator_lookback: Timeframe::default(),
            cache_ttl: CacheTtls::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse service config from {}", path.display()))?;
        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            lookback = %config.indicator_lookback,
            "service config loaded"
        );
        Ok(config)
    }

    /// Apply `STOCKLENS_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("STOCKLENS_BIND_ADDR") {
            let addr = addr.trim();
            if !addr.is_empty() {
                self.bind_addr = addr.to_string();
            }
        }
        if let Ok(url) = std::env::var("STOCKLENS_QUOTE_BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                self.quote_base_url = url.to_string();
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
