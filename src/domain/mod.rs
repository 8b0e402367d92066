//! Domain layer - intent model, capability traits and key derivation

pub mod artifact;
pub mod cache;
pub mod embedding;
pub mod error;
pub mod intent;
pub mod normalizer;
pub mod semantic_cache;

pub use artifact::{Artifact, ArtifactVersion, CacheOptions, Provenance, ProvenanceSource};
pub use cache::{
    build_cache_key, CacheKeyGenerator, CacheKeyParams, Clock, ExactCache, IntentKeyGenerator,
    ManualClock, SystemClock,
};
pub use embedding::{cosine_similarity, Embedder, FnEmbedder};
pub use error::DomainError;
pub use intent::{
    canonicalize_mapping, slot_map, Canonicalizer, DefaultCanonicalizer, IntentRegistry,
    NormalizedIntent, SlotMap, SlotValue,
};
pub use normalizer::Normalizer;
pub use semantic_cache::{SemanticCache, SemanticCacheConfig, SemanticCacheStats, SemanticMatch};
