//! Per-lookup cache options

use serde::{Deserialize, Serialize};

use crate::domain::intent::SlotMap;

/// Options controlling a single lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheOptions {
    /// Consult the semantic tier on exact miss
    #[serde(default)]
    pub enable_semantic: bool,

    /// Minimum similarity (inclusive) for a semantic hit
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Skip the cache entirely
    #[serde(default)]
    pub cache_bypass: bool,

    #[serde(default = "default_artifact_type")]
    pub artifact_type: String,

    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Explicit key scope; takes precedence over caller context
    #[serde(default)]
    pub scope: Option<SlotMap>,
}

fn default_min_score() -> f32 {
    0.85
}

fn default_artifact_type() -> String {
    "intent_cache".to_string()
}

fn default_schema_version() -> String {
    "v1".to_string()
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            enable_semantic: false,
            min_score: default_min_score(),
            cache_bypass: false,
            artifact_type: default_artifact_type(),
            schema_version: default_schema_version(),
            scope: None,
        }
    }
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the semantic tier
    pub fn with_semantic(mut self) -> Self {
        self.enable_semantic = true;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Requests a cache bypass
    pub fn bypass(mut self) -> Self {
        self.cache_bypass = true;
        self
    }

    pub fn with_artifact_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self
    }

    pub fn with_schema_version(mut self, schema_version: impl Into<String>) -> Self {
        self.schema_version = schema_version.into();
        self
    }

    pub fn with_scope(mut self, scope: SlotMap) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Scope used for key derivation
    ///
    /// A non-empty `scope` wins over the caller context; an empty one falls
    /// back to it.
    pub fn resolve_scope<'a>(&'a self, context: Option<&'a SlotMap>) -> Option<&'a SlotMap> {
        self.scope
            .as_ref()
            .filter(|scope| !scope.is_empty())
            .or(context)
    }
}
