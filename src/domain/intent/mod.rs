//! Intent domain - normalized intents, slot values, canonical form and policy

mod canonical;
mod model;
mod registry;
mod value;

pub use canonical::{canonicalize_mapping, canonicalize_value, Canonicalizer, DefaultCanonicalizer};
pub use model::NormalizedIntent;
pub use registry::IntentRegistry;
pub use value::{slot_map, SlotMap, SlotValue};
