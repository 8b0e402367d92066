//! Intent registry implementations

mod simple;

pub use simple::{IntentRule, RegistryConfig, SimpleIntentRegistry, SlotValidator};
