// =============================================================================
// Time-Keyed Cache
// =============================================================================
//
// Maps a compound key (entity kind + symbol + optional sub-key) to the last
// value written together with the instant it was stored. The cache owns no
// TTL policy: callers pass the TTL for their entity kind to `is_stale`.
//
// Thread safety:
//   - parking_lot::RwLock around the map; each operation touches one key.
//   - Concurrent writers to the same key race under last-write-wins.
//
// There is no eviction. Entries are only replaced by the next `set`.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::types::EntityKind;

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for cache timestamps and snapshot stamping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by).expect("test duration fits chrono");
        *self.now.write() += delta;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

// =============================================================================
// Keys and entries
// =============================================================================

/// Composite cache key, e.g. `historical:AAPL:1M`.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    pub kind: EntityKind,
    pub symbol: String,
    pub sub_key: Option<String>,
}

impl CacheKey {
    pub fn new(kind: EntityKind, symbol: impl Into<String>) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            sub_key: None,
        }
    }

    /// Narrow the key further, e.g. by timeframe.
    pub fn with_sub_key(mut self, sub_key: impl Into<String>) -> Self {
        self.sub_key = Some(sub_key.into());
        self
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sub_key {
            Some(sub) => write!(f, "{}:{}:{}", self.kind, self.symbol, sub),
            None => write!(f, "{}:{}", self.kind, self.symbol),
        }
    }
}

/// A stored value and the instant it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: DateTime<Utc>,
}

// =============================================================================
// Cache interface
// =============================================================================

/// Injectable time-keyed store. Handed to the refresh path as
/// `Arc<dyn TimeKeyedCache<V>>` so tests and callers can own separate instances.
pub trait TimeKeyedCache<V>: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry<V>>;

    /// Store `value` stamped with the current time, replacing any prior entry.
    fn set(&self, key: CacheKey, value: V);

    /// True when the entry is absent or older than `ttl`.
    fn is_stale(&self, key: &CacheKey, ttl: Duration) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`TimeKeyedCache`] backed by a `HashMap`.
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V> MemoryCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl<V: Clone + Send + Sync> TimeKeyedCache<V> for MemoryCache<V> {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry<V>> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: CacheKey, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries.write().insert(key, entry);
    }

    fn is_stale(&self, key: &CacheKey, ttl: Duration) -> bool {
        let stored_at = match self.entries.read().get(key) {
            Some(entry) => entry.stored_at,
            None => return true,
        };

        // A TTL too large for chrono never expires.
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => self.clock.now() - stored_at > ttl,
            Err(_) => false,
        }
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn setup() -> (Arc<ManualClock>, MemoryCache<u32>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap(),
        ));
        let cache = MemoryCache::new(clock.clone() as Arc<dyn Clock>);
        (clock, cache)
    }

    fn key(symbol: &str) -> CacheKey {
        CacheKey::new(EntityKind::Indicators, symbol)
    }

    #[test]
    fn get_missing_is_none() {
        let (_, cache) = setup();
        assert!(cache.get(&key("AAPL")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn set_then_get_returns_value_and_timestamp() {
        let (clock, cache) = setup();
        cache.set(key("AAPL"), 7);

        let entry = cache.get(&key("AAPL")).unwrap();
        assert_eq!(entry.value, 7);
        assert_eq!(entry.stored_at, clock.now());
    }

    #[test]
    fn set_overwrites_and_restamps() {
        let (clock, cache) = setup();
        cache.set(key("AAPL"), 1);
        clock.advance(Duration::from_secs(30));
        cache.set(key("AAPL"), 2);

        let entry = cache.get(&key("AAPL")).unwrap();
        assert_eq!(entry.value, 2);
        assert_eq!(entry.stored_at, clock.now());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn absent_entry_is_stale() {
        let (_, cache) = setup();
        assert!(cache.is_stale(&key("MSFT"), Duration::from_secs(300)));
    }

    #[test]
    fn staleness_follows_ttl() {
        let (clock, cache) = setup();
        let ttl = Duration::from_millis(300_000);
        cache.set(key("AAPL"), 1);
        assert!(!cache.is_stale(&key("AAPL"), ttl));

        clock.advance(Duration::from_millis(300_000));
        assert!(!cache.is_stale(&key("AAPL"), ttl), "age == ttl is still fresh");

        clock.advance(Duration::from_millis(1));
        assert!(cache.is_stale(&key("AAPL"), ttl));
    }

    #[test]
    fn ttl_is_chosen_per_call() {
        let (clock, cache) = setup();
        cache.set(key("AAPL"), 1);
        clock.advance(Duration::from_secs(120));
        assert!(cache.is_stale(&key("AAPL"), Duration::from_secs(60)));
        assert!(!cache.is_stale(&key("AAPL"), Duration::from_secs(300)));
    }

    #[test]
    fn huge_ttl_never_expires() {
        let (clock, cache) = setup();
        cache.set(key("AAPL"), 1);
        clock.advance(Duration::from_secs(86_400 * 365));
        assert!(!cache.is_stale(&key("AAPL"), Duration::MAX));
    }

    #[test]
    fn keys_are_isolated_by_kind_and_sub_key() {
        let (_, cache) = setup();
        cache.set(CacheKey::new(EntityKind::Indicators, "AAPL"), 1);
        cache.set(CacheKey::new(EntityKind::Quote, "AAPL"), 2);
        cache.set(CacheKey::new(EntityKind::Historical, "AAPL").with_sub_key("1M"), 3);
        cache.set(CacheKey::new(EntityKind::Historical, "AAPL").with_sub_key("1Y"), 4);

        assert_eq!(cache.len(), 4);
        assert_eq!(cache.get(&CacheKey::new(EntityKind::Quote, "AAPL")).unwrap().value, 2);
        assert_eq!(
            cache
                .get(&CacheKey::new(EntityKind::Historical, "AAPL").with_sub_key("1Y"))
                .unwrap()
                .value,
            4
        );
        assert!(cache.get(&CacheKey::new(EntityKind::Historical, "AAPL")).is_none());
    }

    #[test]
    fn independent_instances_do_not_share_state() {
        let (_, a) = setup();
        let (_, b) = setup();
        a.set(key("AAPL"), 1);
        assert!(b.get(&key("AAPL")).is_none());
    }

    #[test]
    fn key_display() {
        assert_eq!(key("AAPL").to_string(), "indicators:AAPL");
        assert_eq!(
            CacheKey::new(EntityKind::Historical, "TSLA").with_sub_key("3M").to_string(),
            "historical:TSLA:3M"
        );
    }
}
