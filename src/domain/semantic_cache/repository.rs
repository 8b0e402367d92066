//! Semantic cache trait and types

use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::domain::artifact::Artifact;
use crate::domain::intent::SlotMap;
use crate::domain::DomainError;

/// Best match returned by a semantic search
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticMatch {
    pub artifact: Artifact,
    /// Cosine similarity in [-1.0, 1.0]
    pub score: f32,
}

impl SemanticMatch {
    pub fn new(artifact: Artifact, score: f32) -> Self {
        Self { artifact, score }
    }
}

/// Statistics for the semantic cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticCacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Searches that returned a match
    pub hits: u64,
    /// Searches that returned nothing
    pub misses: u64,
    /// Entries evicted to respect capacity
    pub evictions: u64,
}

impl SemanticCacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;

        if total == 0 {
            return 0.0;
        }

        self.hits as f32 / total as f32
    }
}

/// Similarity-based fallback tier
///
/// `search` returns the globally best entry, and only when its score is
/// `>= min_score`. Which of several entries tied at the best score wins is
/// unspecified.
#[cfg_attr(test, automock)]
pub trait SemanticCache: Send + Sync + Debug {
    /// Embeds a canonical intent and its slots
    fn embed(&self, intent: &str, slots: &SlotMap) -> Vec<f32>;

    /// Stores an artifact under a vector
    fn add(&self, vector: Vec<f32>, artifact: Artifact) -> Result<(), DomainError>;

    /// Finds the best entry at or above `min_score`
    fn search(&self, vector: &[f32], min_score: f32) -> Result<Option<SemanticMatch>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_cache_stats() {
        let stats = SemanticCacheStats {
            total_entries: 100,
            hits: 80,
            misses: 20,
            evictions: 5,
        };

        assert!((stats.hit_rate() - 0.8).abs() < 0.01);
    }

    #[test]
    fn test_semantic_cache_stats_no_requests() {
        let stats = SemanticCacheStats::default();

        assert_eq!(stats.hit_rate(), 0.0);
    }
}
