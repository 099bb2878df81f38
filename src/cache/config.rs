//! Cache configuration.

use std::time::Duration;

/// Limits for the avatar blob cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobCacheConfig {
    /// Maximum number of cached blobs. Zero or negative disables the cache.
    pub max_entries: i64,

    /// Maximum sum of blob lengths, in bytes.
    pub max_bytes: u64,
}

impl Default for BlobCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            max_bytes: 50 * 1024 * 1024, // 50 MiB
        }
    }
}

impl BlobCacheConfig {
    pub fn new(max_entries: i64, max_bytes: u64) -> Self {
        Self {
            max_entries,
            max_bytes,
        }
    }
}

/// Configuration for a TTL-bounded Moka cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,

    /// Time-to-live for cache entries.
    /// After this duration, entries are automatically evicted.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with the given max capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ..Default::default()
        }
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    /// Config for per-user profile lookups (nickname, gender).
    ///
    /// Profiles change rarely but are looked up for every mention, so they
    /// get a medium capacity and the given TTL.
    pub fn profiles(ttl: Duration) -> Self {
        Self::with_capacity(5_000).ttl(ttl)
    }
}
