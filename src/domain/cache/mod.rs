//! Cache domain - key derivation and the exact cache abstraction

mod clock;
mod key;
mod repository;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{build_cache_key, CacheKeyGenerator, CacheKeyParams, IntentKeyGenerator};
pub use repository::{effective_ttl, ExactCache};

#[cfg(test)]
pub use repository::MockExactCache;
