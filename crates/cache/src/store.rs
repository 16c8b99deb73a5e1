//! CacheStore - shared, time-bounded result cache

use crate::clock::{Clock, SystemClock};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// One cached value and the time it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub key: String,
    pub data: V,
    /// Epoch milliseconds at insertion
    pub timestamp: i64,
}

impl<V> CacheEntry<V> {
    /// Whether the entry is younger than `ttl` at `now_ms`
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        now_ms.saturating_sub(self.timestamp) < ttl.as_millis() as i64
    }
}

/// Counters for observability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// In-memory cache keyed by query signature.
///
/// Clones share the same underlying map. Stale entries are not evicted on
/// read; they are ignored until overwritten or cleared.
#[derive(Clone)]
pub struct CacheStore<V> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    clock: Arc<dyn Clock>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl<V: Clone> CacheStore<V> {
    /// Create a cache backed by the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cached data for `key` if it was stored less than `ttl` ago
    pub fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        let now = self.clock.now_ms();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());

        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.data.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `data` under `key` with the current timestamp, replacing any
    /// previous entry
    pub fn set(&self, key: impl Into<String>, data: V) {
        let key = key.into();
        let entry = CacheEntry {
            key: key.clone(),
            data,
            timestamp: self.clock.now_ms(),
        };

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, entry);
    }

    /// Remove every entry
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Raw entry regardless of age
    pub fn entry(&self, key: &str) -> Option<CacheEntry<V>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.entries.read().map(|e| e.len()).unwrap_or_default();
        f.debug_struct("CacheStore").field("entries", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const TTL: Duration = Duration::from_secs(300);

    fn store_with_clock() -> (CacheStore<Vec<String>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        (CacheStore::with_clock(clock.clone()), clock)
    }

    // ============== Basic Cache Tests ==============

    #[test]
    fn test_get_missing_key() {
        let (store, _) = store_with_clock();
        assert!(store.get("articles", TTL).is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_set_then_get() {
        let (store, _) = store_with_clock();
        store.set("articles", vec!["a".to_string()]);

        assert_eq!(store.get("articles", TTL), Some(vec!["a".to_string()]));
        assert_eq!(store.stats().hits, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_overwrites_wholesale() {
        let (store, _) = store_with_clock();
        store.set("k", vec!["old".to_string(), "older".to_string()]);
        store.set("k", vec!["new".to_string()]);

        assert_eq!(store.get("k", TTL), Some(vec!["new".to_string()]));
        assert_eq!(store.len(), 1);
    }

    // ============== TTL Tests ==============

    #[test]
    fn test_entry_expires_at_ttl() {
        let (store, clock) = store_with_clock();
        store.set("k", vec![]);

        clock.advance(TTL - Duration::from_millis(1));
        assert!(store.get("k", TTL).is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.get("k", TTL).is_none(), "now - timestamp == ttl is stale");
    }

    #[test]
    fn test_stale_entry_is_not_evicted_on_read() {
        let (store, clock) = store_with_clock();
        store.set("k", vec!["v".to_string()]);
        clock.advance(TTL * 2);

        assert!(store.get("k", TTL).is_none());
        assert!(store.entry("k").is_some());
        // A longer ttl still sees it
        assert!(store.get("k", TTL * 3).is_some());
    }

    #[test]
    fn test_overwrite_refreshes_timestamp() {
        let (store, clock) = store_with_clock();
        store.set("k", vec![]);
        clock.advance(TTL);
        store.set("k", vec!["fresh".to_string()]);

        assert_eq!(store.get("k", TTL), Some(vec!["fresh".to_string()]));
    }

    // ============== Clear Tests ==============

    #[test]
    fn test_clear_removes_everything() {
        let (store, _) = store_with_clock();
        store.set("a", vec![]);
        store.set("b", vec![]);

        store.clear();

        assert!(store.is_empty());
        assert!(store.get("a", TTL).is_none());
    }

    #[test]
    fn test_clones_share_entries() {
        let (store, _) = store_with_clock();
        let other = store.clone();
        other.set("shared", vec!["x".to_string()]);

        assert!(store.get("shared", TTL).is_some());
        store.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn test_debug_output() {
        let (store, _) = store_with_clock();
        store.set("a", vec![]);
        let debug = format!("{:?}", store);
        assert!(debug.contains("CacheStore"));
        assert!(debug.contains("entries: 1"));
    }

    // ============== Concurrency Tests ==============

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_and_set() {
        let store: CacheStore<usize> = CacheStore::new();
        let mut handles = Vec::new();

        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("key{}", i % 4);
                store.set(key.clone(), i);
                store.get(&key, TTL)
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }

        assert_eq!(store.len(), 4);
    }
}
