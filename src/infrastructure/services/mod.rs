//! Infrastructure services

mod intent_cache_service;

pub use intent_cache_service::{IntentCacheService, IntentCacheServiceBuilder};
