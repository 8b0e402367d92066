//! Canonical form for slot and scope mappings
//!
//! Canonical mappings are order-independent and type-stable: temporal values
//! become ISO-8601 text, non-finite floats become text, nulls are removed
//! from lists and nested maps are canonicalized recursively. The result is
//! what cache keys and embeddings are derived from.

use std::fmt::Debug;

use super::value::{SlotMap, SlotValue};

/// Normalizes a mapping into an order-independent, type-stable form
pub trait Canonicalizer: Send + Sync + Debug {
    fn canonicalize(&self, mapping: &SlotMap, drop_empty: bool) -> SlotMap;
}

/// Canonicalizer backed by [`canonicalize_mapping`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCanonicalizer;

impl DefaultCanonicalizer {
    pub fn new() -> Self {
        Self
    }
}

impl Canonicalizer for DefaultCanonicalizer {
    fn canonicalize(&self, mapping: &SlotMap, drop_empty: bool) -> SlotMap {
        canonicalize_mapping(mapping, drop_empty)
    }
}

/// Canonicalizes a mapping
///
/// With `drop_empty`, top-level keys whose canonical value is null, empty
/// text, an empty list or an empty map are removed. Slots are canonicalized
/// with `drop_empty = true`, scope with `false`.
pub fn canonicalize_mapping(mapping: &SlotMap, drop_empty: bool) -> SlotMap {
    mapping
        .iter()
        .map(|(key, value)| (key.clone(), canonicalize_value(value)))
        .filter(|(_, value)| !(drop_empty && value.is_empty_value()))
        .collect()
}

/// Canonicalizes a single value
pub fn canonicalize_value(value: &SlotValue) -> SlotValue {
    match value {
        SlotValue::Float(f) if !f.is_finite() => SlotValue::Text(f.to_string()),
        SlotValue::DateTime(_) | SlotValue::NaiveDateTime(_) | SlotValue::Date(_) => {
            SlotValue::Text(value.iso_text().unwrap_or_default())
        }
        SlotValue::List(items) => SlotValue::List(
            items
                .iter()
                .filter(|item| !matches!(item, SlotValue::Null))
                .map(canonicalize_value)
                .collect(),
        ),
        SlotValue::Map(map) => SlotValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), canonicalize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intent::slot_map;
    use chrono::NaiveDate;

    fn sample() -> SlotMap {
        slot_map([
            ("empty", SlotValue::from("")),
            ("date", SlotValue::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())),
            ("list", SlotValue::from(vec!["b", "a"])),
            (
                "nested",
                SlotValue::from(slot_map([("z", 1), ("a", 2)])),
            ),
            ("missing", SlotValue::Null),
            ("none_list", SlotValue::List(vec![])),
        ])
    }

    #[test]
    fn test_canonicalize_normalizes_values() {
        let result = canonicalize_mapping(&sample(), true);

        assert!(!result.contains_key("empty"));
        assert!(!result.contains_key("missing"));
        assert!(!result.contains_key("none_list"));
        assert_eq!(result.get("date"), Some(&SlotValue::from("2024-01-01")));
        assert_eq!(result.get("list"), Some(&SlotValue::from(vec!["b", "a"])));

        let nested = result.get("nested").and_then(SlotValue::as_map).unwrap();
        let keys: Vec<&str> = nested.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "z"]);
    }

    #[test]
    fn test_list_nulls_removed_order_kept() {
        let slots = slot_map([(
            "items",
            SlotValue::List(vec![
                SlotValue::from("c"),
                SlotValue::Null,
                SlotValue::from("a"),
            ]),
        )]);

        let result = canonicalize_mapping(&slots, true);
        assert_eq!(result.get("items"), Some(&SlotValue::from(vec!["c", "a"])));
    }

    #[test]
    fn test_list_of_only_nulls_becomes_empty_and_is_dropped() {
        let slots = slot_map([("items", SlotValue::List(vec![SlotValue::Null]))]);
        assert!(canonicalize_mapping(&slots, true).is_empty());
        assert_eq!(
            canonicalize_mapping(&slots, false).get("items"),
            Some(&SlotValue::List(vec![]))
        );
    }

    #[test]
    fn test_idempotent() {
        let once = canonicalize_mapping(&sample(), true);
        let twice = canonicalize_mapping(&once, true);
        assert_eq!(once, twice);

        let once_scope = canonicalize_mapping(&sample(), false);
        assert_eq!(canonicalize_mapping(&once_scope, false), once_scope);
    }

    #[test]
    fn test_empty_handling_differs_between_slots_and_scope() {
        let slots = canonicalize_mapping(&sample(), true);
        let scope = canonicalize_mapping(&sample(), false);

        assert_ne!(slots, scope);
        assert_eq!(scope.get("empty"), Some(&SlotValue::from("")));
        assert_eq!(scope.get("missing"), Some(&SlotValue::Null));
    }

    #[test]
    fn test_non_finite_float_becomes_text() {
        let slots = slot_map([("ratio", f64::NAN), ("limit", f64::INFINITY)]);
        let result = canonicalize_mapping(&slots, true);

        assert_eq!(result.get("ratio"), Some(&SlotValue::from("NaN")));
        assert_eq!(result.get("limit"), Some(&SlotValue::from("inf")));
    }

    #[test]
    fn test_default_canonicalizer_delegates() {
        let canonicalizer = DefaultCanonicalizer::new();
        let mapping = slot_map([("topic", ""), ("lang", "en")]);

        assert_eq!(
            canonicalizer.canonicalize(&mapping, true),
            slot_map([("lang", "en")])
        );
        assert_eq!(canonicalizer.canonicalize(&mapping, false), mapping);
    }
}
