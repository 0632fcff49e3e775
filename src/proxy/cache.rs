//! Lazy-expiry TTL cache for the two slow-changing upstream queries.
//!
//! Only the symbol list and the global date range are memoized — every other
//! endpoint depends on per-request parameters. Expiry is evaluated at read
//! time; stale entries are overwritten on the next fetch, never swept. Two
//! concurrent misses may both fetch upstream and both store; the fetch is
//! idempotent so last-writer-wins is fine.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Logical query identity — the full fixed key set of this design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Symbols,
    DateRange,
}

#[derive(Debug, Default)]
pub struct TtlCache {
    entries: DashMap<CacheKey, (Value, Instant)>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: CacheKey) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    pub fn put(&self, key: CacheKey, value: Value) {
        self.put_at(key, value, Instant::now());
    }

    fn get_at(&self, key: CacheKey, now: Instant) -> Option<Value> {
        let entry = self.entries.get(&key)?;
        let (value, fetched_at) = entry.value();
        if now.duration_since(*fetched_at) < CACHE_TTL {
            Some(value.clone())
        } else {
            None
        }
    }

    fn put_at(&self, key: CacheKey, value: Value, now: Instant) {
        self.entries.insert(key, (value, now));
    }
}
