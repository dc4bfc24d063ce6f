//! Cache configuration.

use std::time::Duration;

/// Configuration for a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,

    /// Time-to-live for cache entries, measured from the write.
    /// After this duration, entries are automatically evicted.
    pub ttl: Option<Duration>,

    /// Time-to-idle for cache entries.
    /// Entries are evicted if not accessed within this duration.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: None,
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

    /// Set max capacity for cache (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    /// Set time-to-idle for cache entries.
    #[must_use]
    pub fn tti(mut self, duration: Duration) -> Self {
        self.tti = Some(duration);
        self
    }

    /// Config for continuation stores.
    ///
    /// Fixed TTL from write and no idle extension: reading a continuation
    /// must not keep it alive.
    pub fn continuation() -> Self {
        Self {
            max_capacity: 1_000,
            ttl: Some(Duration::from_secs(600)), // 10 minutes
            tti: None,
        }
    }

    /// Config for runtime settings (prefix, admin list).
    /// Small and short-lived so edits show up quickly.
    pub fn settings() -> Self {
        Self {
            max_capacity: 100,
            ttl: Some(Duration::from_secs(60)), // 1 minute
            tti: None,
        }
    }

    /// Config for directory-style lookups (accounts, tracked users).
    pub fn directory() -> Self {
        Self {
            max_capacity: 5_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: None,
        }
    }
}
