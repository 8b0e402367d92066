//! Artifact domain - cached results, provenance and lookup options

mod model;
mod options;

pub use model::{Artifact, ArtifactVersion, Provenance, ProvenanceSource};
pub use options::CacheOptions;
