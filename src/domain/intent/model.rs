//! Normalized intent model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value::{SlotMap, SlotValue};

/// Coarse intent label plus structured slot values extracted from a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedIntent {
    pub intent: String,
    #[serde(default)]
    pub slots: SlotMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl NormalizedIntent {
    /// Creates an intent without slots
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            slots: SlotMap::new(),
            meta: None,
        }
    }

    /// Replaces the slots
    pub fn with_slots(mut self, slots: SlotMap) -> Self {
        self.slots = slots;
        self
    }

    /// Adds a single slot
    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<SlotValue>) -> Self {
        self.slots.insert(name.into(), value.into());
        self
    }

    /// Adds a metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }
}
