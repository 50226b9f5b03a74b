//! Response cache.
//!
//! Only GET calls participate. Entries are keyed by
//! `root + path + '?' + query` and hold post-parse results; how long an
//! entry stays fresh is decided by the cache, not by the caller.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;

/// Storage for parsed results.
pub trait ResponseCache<V>: Send + Sync {
    /// Fresh value for `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    fn put(&self, key: &str, value: V);
}

/// Cache key for a bound call.
pub fn cache_key(root: &str, path: &str, query: &str) -> String {
    format!("{root}{path}?{query}")
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// In-memory LRU cache with a per-entry time-to-live.
pub struct MemoryCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> MemoryCache<V> {
    pub const DEFAULT_CAPACITY: usize = 100;

    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(Self::DEFAULT_CAPACITY, ttl)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry<V>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<V: Clone + Send> ResponseCache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let expired = entries.get(key)?.stored_at.elapsed() >= self.ttl;
        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    fn put(&self, key: &str, value: V) {
        self.lock().put(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_returns_values() {
        let cache = MemoryCache::with_ttl(Duration::from_secs(60));
        cache.put("/1.1/users/show.json?id=1", "alice".to_string());
        assert_eq!(
            cache.get("/1.1/users/show.json?id=1").as_deref(),
            Some("alice")
        );
        assert_eq!(cache.get("/1.1/users/show.json?id=2"), None);
    }

    #[test]
    fn expired_entries_are_evicted() {
        let cache = MemoryCache::with_ttl(Duration::ZERO);
        cache.put("k", 1u32);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_bounds_entries() {
        let cache = MemoryCache::new(2, Duration::from_secs(60));
        cache.put("a", 1u32);
        cache.put("b", 2);
        cache.put("c", 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn key_joins_root_path_and_query() {
        assert_eq!(
            cache_key("/1.1", "/statuses/show.json", "id=5"),
            "/1.1/statuses/show.json?id=5"
        );
    }
}
