use lru::LruCache;
use std::fmt::Display;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::types::CachedEntry;

const MIN_CAPACITY: NonZeroUsize = NonZeroUsize::MIN;

/// TTL-bounded LRU cache owned by the component that uses it.
///
/// Keys are deterministic strings or ids derived from the cached entity and
/// its parameters. Expired entries are removed lazily on lookup.
#[derive(Debug)]
pub struct TtlCache<K: Hash + Eq, V> {
    name: &'static str,
    ttl: Duration,
    entries: RwLock<LruCache<K, CachedEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Display,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries (minimum 1)
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(MIN_CAPACITY);
        Self {
            name,
            ttl,
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Returns a clone of the cached value if present and not expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.entries.write().await;

        if let Some(entry) = cache.get(key) {
            if !entry.is_expired() {
                debug!(
                    "Cache hit: cache={}, key={}, age={:?}",
                    self.name,
                    key,
                    entry.cached_at.elapsed()
                );
                return Some(entry.data.clone());
            }

            warn!(
                "Removing expired cache entry: cache={}, key={}, age={:?}, ttl={:?}",
                self.name,
                key,
                entry.cached_at.elapsed(),
                entry.get_ttl()
            );
            cache.pop(key);
        } else {
            debug!("Cache miss: cache={}, key={}", self.name, key);
        }

        None
    }

    pub async fn insert(&self, key: K, value: V) {
        let mut cache = self.entries.write().await;
        debug!("Caching entry: cache={}, key={}", self.name, key);
        cache.put(key, CachedEntry::new(value, self.ttl));
    }

    /// Removes one entry. Returns true if it was present.
    pub async fn invalidate(&self, key: &K) -> bool {
        let removed = self.entries.write().await.pop(key).is_some();
        if removed {
            debug!("Invalidated cache entry: cache={}, key={}", self.name, key);
        }
        removed
    }

    /// Removes every entry whose key or value matches `predicate`.
    /// Returns the number of entries removed.
    pub async fn invalidate_if<F>(&self, predicate: F) -> usize
    where
        F: Fn(&K, &V) -> bool,
    {
        let mut cache = self.entries.write().await;
        let doomed: Vec<K> = cache
            .iter()
            .filter(|(key, entry)| predicate(key, &entry.data))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            cache.pop(key);
        }

        if !doomed.is_empty() {
            debug!(
                "Invalidated {} cache entries: cache={}",
                doomed.len(),
                self.name
            );
        }
        doomed.len()
    }

    pub async fn clear(&self) {
        let mut cache = self.entries.write().await;
        let count = cache.len();
        cache.clear();
        info!("Cleared cache: cache={}, entries={}", self.name, count);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.entries.read().await.cap().get()
    }
}
