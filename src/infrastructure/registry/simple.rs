//! Allow-list intent registry

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::intent::{IntentRegistry, SlotMap};

/// Custom slot check for constraints beyond slot names
pub type SlotValidator = Arc<dyn Fn(&SlotMap) -> bool + Send + Sync>;

/// Slot policy for one intent, as loaded from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentRule {
    /// Slot names that may appear; absent means any
    #[serde(default)]
    pub allowed_slots: Option<Vec<String>>,
    /// Slot names that must appear
    #[serde(default)]
    pub required_slots: Option<Vec<String>>,
}

/// Declarative registry definition keyed by intent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub intents: BTreeMap<String, IntentRule>,
}

/// Registry backed by an explicit allow-list of intents
///
/// For an allowed intent, every configured check must pass: no slot outside
/// the allowed set, every required slot present, and the custom validator
/// (if any) returning `true`.
#[derive(Clone, Default)]
pub struct SimpleIntentRegistry {
    allowed_intents: HashSet<String>,
    allowed_slots: HashMap<String, HashSet<String>>,
    required_slots: HashMap<String, HashSet<String>>,
    validators: HashMap<String, SlotValidator>,
}

impl fmt::Debug for SimpleIntentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleIntentRegistry")
            .field("allowed_intents", &self.allowed_intents)
            .field("allowed_slots", &self.allowed_slots)
            .field("required_slots", &self.required_slots)
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SimpleIntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a declarative config
    pub fn from_config(config: &RegistryConfig) -> Self {
        config
            .intents
            .iter()
            .fold(Self::new(), |registry, (intent, rule)| {
                let mut registry = registry.allow(intent.clone());

                if let Some(ref allowed) = rule.allowed_slots {
                    registry = registry.with_allowed_slots(intent.clone(), allowed.iter().cloned());
                }

                if let Some(ref required) = rule.required_slots {
                    registry =
                        registry.with_required_slots(intent.clone(), required.iter().cloned());
                }

                registry
            })
    }

    /// Adds an intent to the allow-list
    pub fn allow(mut self, intent: impl Into<String>) -> Self {
        self.allowed_intents.insert(intent.into());
        self
    }

    /// Restricts which slot names an intent may carry
    pub fn with_allowed_slots<S: Into<String>>(
        mut self,
        intent: impl Into<String>,
        slots: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_slots
            .insert(intent.into(), slots.into_iter().map(Into::into).collect());
        self
    }

    /// Declares slot names an intent must carry
    pub fn with_required_slots<S: Into<String>>(
        mut self,
        intent: impl Into<String>,
        slots: impl IntoIterator<Item = S>,
    ) -> Self {
        self.required_slots
            .insert(intent.into(), slots.into_iter().map(Into::into).collect());
        self
    }

    /// Attaches a custom slot validator to an intent
    pub fn with_validator<F>(mut self, intent: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&SlotMap) -> bool + Send + Sync + 'static,
    {
        self.validators.insert(intent.into(), Arc::new(validator));
        self
    }
}

impl IntentRegistry for SimpleIntentRegistry {
    fn is_allowed(&self, intent: &str) -> bool {
        self.allowed_intents.contains(intent)
    }

    fn validate_slots(&self, intent: &str, slots: &SlotMap) -> bool {
        if !self.is_allowed(intent) {
            return false;
        }

        if let Some(allowed) = self.allowed_slots.get(intent) {
            if let Some(unknown) = slots.keys().find(|name| !allowed.contains(name.as_str())) {
                debug!(intent = %intent, slot = %unknown, "Slot not allowed");
                return false;
            }
        }

        if let Some(required) = self.required_slots.get(intent) {
            if let Some(missing) = required.iter().find(|name| !slots.contains_key(name.as_str())) {
                debug!(intent = %intent, slot = %missing, "Required slot missing");
                return false;
            }
        }

        match self.validators.get(intent) {
            Some(validator) => validator(slots),
            None => true,
        }
    }
}
