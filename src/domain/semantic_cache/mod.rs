//! Semantic cache domain models and traits
//!
//! Provides vector-based lookup that matches similar intents when the exact
//! key misses.

mod config;
mod repository;

pub use config::SemanticCacheConfig;
pub use repository::{SemanticCache, SemanticCacheStats, SemanticMatch};

#[cfg(test)]
pub use repository::MockSemanticCache;
