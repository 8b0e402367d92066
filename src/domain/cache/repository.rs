//! Exact cache trait definition

use std::fmt::Debug;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::domain::artifact::Artifact;
use crate::domain::DomainError;

/// Deterministic key -> artifact store with TTL expiry
///
/// Implementations must be safe for concurrent reads; concurrent writes to
/// the same key are last-write-wins. Backing-store failures are errors,
/// never `Ok(None)`.
#[cfg_attr(test, automock)]
pub trait ExactCache: Send + Sync + Debug {
    /// Gets the artifact stored at `key`, or `None` if absent or expired
    fn get(&self, key: &str) -> Result<Option<Artifact>, DomainError>;

    /// Stores `artifact` at `key`
    ///
    /// `ttl_seconds` overrides `artifact.ttl_seconds`; zero means no expiry.
    fn set(&self, key: &str, artifact: &Artifact, ttl_seconds: Option<u64>)
        -> Result<(), DomainError>;
}

/// Effective time-to-live for a write, `None` meaning no expiry
pub fn effective_ttl(artifact: &Artifact, ttl_override: Option<u64>) -> Option<Duration> {
    match ttl_override.unwrap_or(artifact.ttl_seconds) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}
