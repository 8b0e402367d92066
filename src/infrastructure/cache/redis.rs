//! Redis exact cache implementation

use std::fmt;
use std::time::Duration;

use r2d2::Pool;
use redis::{Client, Commands, Connection};
use tracing::{debug, warn};

use crate::domain::artifact::Artifact;
use crate::domain::cache::{effective_ttl, ExactCache};
use crate::domain::DomainError;

pub const DEFAULT_KEY_PREFIX: &str = "intent_cache:";

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Prefix prepended verbatim to every key
    pub key_prefix: String,
    /// How long a command waits for a pooled connection
    pub connection_timeout: Duration,
    /// Upper bound on open connections
    pub max_connections: u32,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            connection_timeout: Duration::from_secs(5),
            max_connections: 8,
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets the connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the connection pool size
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

/// Exact cache stored in Redis
///
/// Artifacts are stored as JSON. TTL enforcement is delegated to Redis
/// (`SETEX`); entries without a TTL are written with plain `SET`. Commands
/// run on an r2d2 pool that opens connections on demand and replaces broken
/// ones, so concurrent lookups do not queue behind a single connection.
/// Every Redis failure surfaces as [`DomainError::Cache`].
pub struct RedisExactCache {
    pool: Pool<Client>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisExactCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisExactCache")
            .field("config", &self.config)
            .field("pool", &"<Pool>")
            .finish()
    }
}

impl RedisExactCache {
    /// Creates a cache client without connecting
    pub fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        debug!(
            url = %config.url,
            max_connections = config.max_connections,
            "Creating Redis connection pool"
        );
        let pool = Pool::builder()
            .max_size(config.max_connections.max(1))
            .min_idle(Some(0))
            .connection_timeout(config.connection_timeout)
            .build_unchecked(client);

        Ok(Self { pool, config })
    }

    /// Creates a Redis cache with default configuration
    pub fn with_url(url: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(RedisCacheConfig::new(url))
    }

    fn prefix_key(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> redis::RedisResult<T>,
    ) -> Result<T, DomainError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        op(&mut *conn).map_err(|e| {
            warn!(error = %e, "Redis command failed");
            DomainError::cache(format!("Redis command failed: {}", e))
        })
    }

    /// Removes `key`, returning whether it was present
    pub fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let deleted: i64 = self.with_connection(|conn| conn.del(&prefixed_key))?;
        Ok(deleted > 0)
    }
}

impl ExactCache for RedisExactCache {
    fn get(&self, key: &str) -> Result<Option<Artifact>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let raw: Option<String> = self.with_connection(|conn| conn.get(&prefixed_key))?;

        match raw {
            Some(data) => {
                let artifact = serde_json::from_str(&data).map_err(|e| {
                    DomainError::cache(format!("Failed to decode artifact at '{}': {}", key, e))
                })?;
                Ok(Some(artifact))
            }
            None => Ok(None),
        }
    }

    fn set(
        &self,
        key: &str,
        artifact: &Artifact,
        ttl_seconds: Option<u64>,
    ) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let data = serde_json::to_string(artifact)
            .map_err(|e| DomainError::cache(format!("Failed to encode artifact: {}", e)))?;

        match effective_ttl(artifact, ttl_seconds) {
            Some(ttl) => self.with_connection(|conn| {
                conn.set_ex::<_, _, ()>(&prefixed_key, &data, ttl.as_secs())
            }),
            None => self.with_connection(|conn| conn.set::<_, _, ()>(&prefixed_key, &data)),
        }
    }
}
