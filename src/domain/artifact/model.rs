//! Cached artifact and provenance

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::intent::SlotMap;

/// Schema version of an artifact, either textual ("v1") or numeric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactVersion {
    Number(i64),
    Text(String),
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactVersion::Number(n) => write!(f, "{}", n),
            ArtifactVersion::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ArtifactVersion {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArtifactVersion {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ArtifactVersion {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Which tier produced a returned artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceSource {
    /// Exact key match
    Cache,
    /// Similarity match
    Semantic,
}

impl fmt::Display for ProvenanceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvenanceSource::Cache => write!(f, "cache"),
            ProvenanceSource::Semantic => write!(f, "semantic"),
        }
    }
}

/// Provenance metadata attached to a returned artifact
///
/// `score` is only present for semantic hits. Unknown entries written by
/// other producers are preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ProvenanceSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Provenance {
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.key.is_none() && self.score.is_none() && self.extra.is_empty()
    }
}

/// A cached result for an intent + slots + scope combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub payload: Value,
    pub version: ArtifactVersion,
    #[serde(default)]
    pub scope: SlotMap,
    /// Zero means no expiry
    #[serde(default)]
    pub ttl_seconds: u64,
    #[serde(default, skip_serializing_if = "Provenance::is_empty")]
    pub provenance: Provenance,
}

impl Artifact {
    /// Creates an artifact without scope, expiry or provenance
    pub fn new(
        artifact_type: impl Into<String>,
        payload: Value,
        version: impl Into<ArtifactVersion>,
    ) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            payload,
            version: version.into(),
            scope: SlotMap::new(),
            ttl_seconds: 0,
            provenance: Provenance::default(),
        }
    }

    pub fn with_scope(mut self, scope: SlotMap) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Returns this artifact stamped with lookup provenance
    ///
    /// Existing `extra` entries survive; `source`, `key` and `score` are
    /// overwritten.
    pub fn with_provenance(
        mut self,
        source: ProvenanceSource,
        key: impl Into<String>,
        score: Option<f32>,
    ) -> Self {
        self.provenance.source = Some(source);
        self.provenance.key = Some(key.into());
        self.provenance.score = score;
        self
    }
}
