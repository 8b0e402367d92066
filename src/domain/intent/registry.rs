//! Intent registry trait

use std::fmt::Debug;

use super::value::SlotMap;

/// Policy deciding which intents and slot combinations may be served from cache
///
/// Rejections are plain `false`, never errors.
pub trait IntentRegistry: Send + Sync + Debug {
    /// Whether the intent is permitted at all
    fn is_allowed(&self, intent: &str) -> bool;

    /// Whether the slots satisfy the intent's slot policy
    fn validate_slots(&self, intent: &str, slots: &SlotMap) -> bool;
}
