//! In-memory semantic cache implementation

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::domain::artifact::Artifact;
use crate::domain::embedding::{cosine_similarity, Embedder};
use crate::domain::intent::SlotMap;
use crate::domain::semantic_cache::{
    SemanticCache, SemanticCacheConfig, SemanticCacheStats, SemanticMatch,
};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct SemanticEntry {
    vector: Vec<f32>,
    artifact: Artifact,
}

#[derive(Debug, Default)]
struct Store {
    entries: VecDeque<SemanticEntry>,
    /// Fixed by configuration, the embedder, or the first insert
    dimensions: Option<usize>,
}

/// In-memory semantic cache using a full linear scan
///
/// Every search compares the query against every stored vector, so the
/// globally best entry is always found. Entries are kept in insertion order;
/// when `max_entries` is reached the oldest entry is evicted.
#[derive(Debug)]
pub struct InMemorySemanticCache {
    embedder: Arc<dyn Embedder>,
    store: RwLock<Store>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl InMemorySemanticCache {
    /// Creates a cache whose dimensionality comes from the embedder, or from
    /// the first vector added
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        let dimensions = embedder.dimensions();

        Self {
            embedder,
            store: RwLock::new(Store {
                entries: VecDeque::new(),
                dimensions,
            }),
            max_entries: usize::MAX,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Creates a cache from configuration
    pub fn from_config(embedder: Arc<dyn Embedder>, config: &SemanticCacheConfig) -> Self {
        Self::new(embedder)
            .with_max_entries(config.max_entries)
            .with_dimensions(config.dimensions)
    }

    /// Bounds the number of stored entries
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Fixes the vector dimensionality
    pub fn with_dimensions(self, dimensions: usize) -> Self {
        if let Ok(mut store) = self.store.write() {
            store.dimensions = Some(dimensions);
        }
        self
    }

    /// Current dimensionality, if fixed
    pub fn dimensions(&self) -> Option<usize> {
        self.store.read().ok().and_then(|store| store.dimensions)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.store.read().map(|store| store.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry and resets statistics
    pub fn clear(&self) -> Result<(), DomainError> {
        let mut store = self.store.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        store.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);

        Ok(())
    }

    pub fn stats(&self) -> SemanticCacheStats {
        SemanticCacheStats {
            total_entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn evict_if_needed(&self, store: &mut Store) {
        while store.entries.len() >= self.max_entries {
            if store.entries.pop_front().is_none() {
                break;
            }
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl SemanticCache for InMemorySemanticCache {
    fn embed(&self, intent: &str, slots: &SlotMap) -> Vec<f32> {
        self.embedder.embed(intent, slots)
    }

    fn add(&self, vector: Vec<f32>, artifact: Artifact) -> Result<(), DomainError> {
        if vector.is_empty() {
            return Err(DomainError::validation("Cannot store an empty vector"));
        }

        let mut store = self.store.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        match store.dimensions {
            Some(dimensions) if dimensions != vector.len() => {
                return Err(DomainError::validation(format!(
                    "Vector has {} dimensions, cache expects {}",
                    vector.len(),
                    dimensions
                )));
            }
            Some(_) => {}
            None => store.dimensions = Some(vector.len()),
        }

        self.evict_if_needed(&mut store);
        store.entries.push_back(SemanticEntry { vector, artifact });

        Ok(())
    }

    fn search(&self, vector: &[f32], min_score: f32) -> Result<Option<SemanticMatch>, DomainError> {
        let store = self.store.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut best: Option<(&SemanticEntry, f32)> = None;

        for entry in &store.entries {
            let Some(score) = cosine_similarity(vector, &entry.vector) else {
                continue;
            };

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((entry, score));
            }
        }

        match best {
            Some((entry, score)) if score >= min_score => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(score, min_score, "Semantic cache hit");
                Ok(Some(SemanticMatch::new(entry.artifact.clone(), score)))
            }
            best => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(
                    best_score = best.map(|(_, score)| score),
                    min_score,
                    "Semantic cache miss"
                );
                Ok(None)
            }
        }
    }
}
