//! Cache entry with TTL support

use std::time::{Duration, Instant};
use tracing::debug;

/// A cached value stamped with its insertion time and lifetime
#[derive(Debug, Clone)]
pub struct CachedEntry<V> {
    pub data: V,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl<V> CachedEntry<V> {
    /// Creates a new cache entry that lives for `ttl`
    pub fn new(data: V, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Checks if the entry has outlived its TTL
    pub fn is_expired(&self) -> bool {
        let age = self.cached_at.elapsed();
        let is_expired = age > self.ttl;

        debug!(
            "Cache expiration check: age={:?}, ttl={:?}, is_expired={}",
            age, self.ttl, is_expired
        );

        is_expired
    }

    /// Gets the TTL duration for this cache entry
    pub fn get_ttl(&self) -> Duration {
        self.ttl
    }

    /// Gets the remaining time until expiration
    pub fn time_until_expiry(&self) -> Duration {
        self.ttl.saturating_sub(self.cached_at.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_is_not_expired() {
        let entry = CachedEntry::new(42, Duration::from_secs(60));
        assert!(!entry.is_expired());
        assert_eq!(entry.get_ttl(), Duration::from_secs(60));
        assert!(entry.time_until_expiry() <= Duration::from_secs(60));
    }

    #[test]
    fn test_zero_ttl_entry_expires() {
        let entry = CachedEntry::new("value", Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        assert!(entry.is_expired());
        assert_eq!(entry.time_until_expiry(), Duration::ZERO);
    }
}
