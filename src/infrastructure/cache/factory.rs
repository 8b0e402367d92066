//! Exact cache factory for runtime selection

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::cache::ExactCache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCacheConfig, InMemoryExactCache};
use super::redis::{RedisCacheConfig, RedisExactCache, DEFAULT_KEY_PREFIX};

/// Supported exact cache backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// In-process cache using moka
    #[default]
    #[serde(alias = "inmemory", alias = "memory")]
    InMemory,
    /// Redis cache
    Redis,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Backend selection for the exact tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactCacheConfig {
    #[serde(default)]
    pub cache_type: CacheType,
    /// Redis URL (required for Redis type)
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Key prefix (Redis only)
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Maximum capacity (in-memory only)
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_max_capacity() -> u64 {
    10_000
}

impl Default for ExactCacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::InMemory,
            redis_url: None,
            key_prefix: default_key_prefix(),
            max_capacity: default_max_capacity(),
        }
    }
}

impl ExactCacheConfig {
    /// Configuration for the in-memory backend
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Configuration for the Redis backend
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            cache_type: CacheType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets the maximum capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Factory for exact cache instances
#[derive(Debug, Default)]
pub struct ExactCacheFactory;

impl ExactCacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates an exact cache based on configuration
    pub fn create(&self, config: &ExactCacheConfig) -> Result<Arc<dyn ExactCache>, DomainError> {
        info!(cache_type = %config.cache_type, "Creating exact cache");

        match config.cache_type {
            CacheType::InMemory => {
                let in_memory_config =
                    InMemoryCacheConfig::default().with_max_capacity(config.max_capacity);

                Ok(Arc::new(InMemoryExactCache::with_config(in_memory_config)))
            }
            CacheType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for Redis cache type")
                })?;

                let redis_config =
                    RedisCacheConfig::new(url).with_key_prefix(config.key_prefix.clone());

                Ok(Arc::new(RedisExactCache::new(redis_config)?))
            }
        }
    }
}
