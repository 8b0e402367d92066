//! Intent Cache
//!
//! Answers "have we already produced a result for this kind of request?"
//! before any expensive generation runs:
//! - Normalizes raw text into an intent plus slot values
//! - Gates intents and slots through a registry policy
//! - Derives a deterministic, order-independent cache key
//! - Looks up an exact tier (in-memory or Redis), then an optional
//!   similarity-based semantic tier

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    build_cache_key, Artifact, CacheOptions, DomainError, NormalizedIntent, Normalizer,
    ProvenanceSource, SlotMap, SlotValue,
};
pub use infrastructure::services::{IntentCacheService, IntentCacheServiceBuilder};

use std::sync::Arc;

use infrastructure::{
    cache::ExactCacheFactory, embedding::HashingEmbedder, registry::SimpleIntentRegistry,
    semantic_cache::InMemorySemanticCache,
};
use tracing::info;

/// Create the lookup service from configuration
///
/// The normalizer is the one collaborator configuration cannot describe, so
/// the caller supplies it.
pub fn create_intent_cache_service(
    config: &AppConfig,
    normalizer: Arc<dyn Normalizer>,
) -> anyhow::Result<IntentCacheService> {
    let exact_cache = ExactCacheFactory::new().create(&config.cache)?;

    info!(
        intents = config.registry.intents.len(),
        "Loaded intent registry"
    );
    let registry = Arc::new(SimpleIntentRegistry::from_config(&config.registry));

    let mut builder = IntentCacheService::builder()
        .normalizer(normalizer)
        .registry(registry)
        .exact_cache(exact_cache)
        .default_options(config.options.clone());

    if config.semantic.enabled {
        info!(
            dimensions = config.semantic.dimensions,
            max_entries = config.semantic.max_entries,
            "Semantic cache enabled"
        );
        let embedder = Arc::new(HashingEmbedder::new(config.semantic.dimensions));
        builder = builder.semantic_cache(Arc::new(InMemorySemanticCache::from_config(
            embedder,
            &config.semantic,
        )));
    }

    Ok(builder.build()?)
}
