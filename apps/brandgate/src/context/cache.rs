//! Time-expiring cache with an injectable clock.
//!
//! Entries are `{value, inserted_at}`. A read is served while
//! `now - inserted_at < ttl`; after that the entry is treated as absent and
//! the next fill replaces it. There is no invalidation on file change.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default staleness window for context documents.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Source of the current time for cache expiry.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Used to drive expiry in tests.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// String-keyed TTL cache. Values are cloned out, so store `Arc`s.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Insert or replace `key`, stamping it with the current time.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let inserted_at = self.clock.now();
        self.entries
            .lock()
            .insert(key.into(), Entry { value, inserted_at });
    }

    /// Serve from cache or run `fill` and store its success.
    ///
    /// The lock is not held across `fill`, so two concurrent misses on the
    /// same key may both fill; the later insert wins.
    pub async fn try_get_or_insert_with<E, F, Fut>(&self, key: &str, fill: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = fill().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Number of stored entries, including expired ones not yet replaced.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(clock: Arc<ManualClock>) -> TtlCache<Arc<str>> {
        TtlCache::new(DEFAULT_TTL, clock)
    }

    #[test]
    fn serves_within_window_and_expires_after() {
        let clock = Arc::new(ManualClock::new());
        let c = cache(clock.clone());
        c.insert("a", Arc::from("one"));
        clock.advance(Duration::from_secs(299));
        assert_eq!(c.get("a").as_deref(), Some("one"));
        clock.advance(Duration::from_secs(1));
        assert!(c.get("a").is_none());
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn insert_replaces_and_restamps() {
        let clock = Arc::new(ManualClock::new());
        let c = cache(clock.clone());
        c.insert("a", Arc::from("one"));
        clock.advance(Duration::from_secs(400));
        c.insert("a", Arc::from("two"));
        assert_eq!(c.get("a").as_deref(), Some("two"));
        assert_eq!(c.len(), 1);
    }

    #[tokio::test]
    async fn fill_runs_once_per_window() {
        let clock = Arc::new(ManualClock::new());
        let c = cache(clock.clone());
        let mut fills = 0;
        for _ in 0..3 {
            let v: Result<_, ()> = c
                .try_get_or_insert_with("k", || {
                    fills += 1;
                    async { Ok(Arc::from("v")) }
                })
                .await;
            assert_eq!(v.unwrap().as_ref(), "v");
        }
        assert_eq!(fills, 1);
    }

    #[tokio::test]
    async fn failed_fill_is_not_cached() {
        let c: TtlCache<Arc<str>> = TtlCache::new(DEFAULT_TTL, Arc::new(SystemClock));
        let r: Result<Arc<str>, &str> = c
            .try_get_or_insert_with("k", || async { Err("boom") })
            .await;
        assert!(r.is_err());
        assert!(c.get("k").is_none());
    }
}
