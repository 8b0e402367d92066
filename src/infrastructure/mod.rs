//! Infrastructure layer - cache backends, normalizers and the lookup service

pub mod cache;
pub mod embedding;
pub mod logging;
pub mod normalizer;
pub mod registry;
pub mod semantic_cache;
pub mod services;
