//! Semantic cache configuration

use serde::{Deserialize, Serialize};

/// Configuration for the semantic tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Whether a semantic tier is constructed at all
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of entries to store
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Vector dimensionality shared by the embedder and the store
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_max_entries() -> usize {
    10000
}

fn default_dimensions() -> usize {
    256
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: default_max_entries(),
            dimensions: default_dimensions(),
        }
    }
}

impl SemanticCacheConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the semantic tier is enabled
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set maximum entries
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set vector dimensionality
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }
}
