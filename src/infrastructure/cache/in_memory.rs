//! In-memory exact cache using moka

use std::sync::Arc;

use moka::ops::compute::Op;
use moka::sync::Cache as MokaCache;
use tracing::debug;

use crate::domain::artifact::Artifact;
use crate::domain::cache::{effective_ttl, Clock, ExactCache, SystemClock};
use crate::domain::DomainError;

/// Configuration for the in-memory exact cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryCacheConfig {
    /// Sets the maximum capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    artifact: Artifact,
    /// Absolute expiry in millis since epoch, `None` for no expiry
    expires_at: Option<u64>,
}

impl CacheEntry {
    fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Process-local exact cache
///
/// Expiry is tracked per entry against the injected [`Clock`] and enforced
/// lazily: an expired entry is evicted by the `get` that observes it. Writes
/// and evictions go through moka's per-key compute lock, so an eviction only
/// removes the entry if it is still expired. Moka only bounds capacity.
#[derive(Debug)]
pub struct InMemoryExactCache {
    cache: MokaCache<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl InMemoryExactCache {
    /// Creates a cache with default configuration and the wall clock
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    /// Creates a cache with the given configuration and the wall clock
    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache driven by a custom clock
    pub fn with_clock(config: InMemoryCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: MokaCache::builder().max_capacity(config.max_capacity).build(),
            clock,
        }
    }

    /// Removes `key`, returning whether it was present
    pub fn delete(&self, key: &str) -> bool {
        self.cache.remove(key).is_some()
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of stored entries, expired ones included
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl InMemoryExactCache {
    /// Removes `key` only if the entry stored now is still expired
    fn evict_expired(&self, key: &str) {
        let now = self.clock.now_millis();

        self.cache
            .entry(key.to_string())
            .and_compute_with(|current| match current {
                Some(current) if current.value().is_expired(now) => {
                    debug!(key = %key, "Evicting expired cache entry");
                    Op::Remove
                }
                _ => Op::Nop,
            });
    }
}

impl Default for InMemoryExactCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ExactCache for InMemoryExactCache {
    fn get(&self, key: &str) -> Result<Option<Artifact>, DomainError> {
        let Some(entry) = self.cache.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(self.clock.now_millis()) {
            self.evict_expired(key);
            return Ok(None);
        }

        Ok(Some(entry.artifact))
    }

    fn set(
        &self,
        key: &str,
        artifact: &Artifact,
        ttl_seconds: Option<u64>,
    ) -> Result<(), DomainError> {
        let expires_at = effective_ttl(artifact, ttl_seconds)
            .map(|ttl| self.clock.now_millis().saturating_add(ttl.as_millis() as u64));

        let entry = CacheEntry {
            artifact: artifact.clone(),
            expires_at,
        };
        self.cache
            .entry(key.to_string())
            .and_compute_with(|_| Op::Put(entry));

        Ok(())
    }
}
