//! Slot value model

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Mapping used for slots, scope and caller context
pub type SlotMap = BTreeMap<String, SlotValue>;

/// A single slot (or scope/context) value
///
/// Deserializes from any JSON value. Temporal variants serialize as
/// ISO-8601 text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum SlotValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<FixedOffset>),
    NaiveDateTime(NaiveDateTime),
    Date(NaiveDate),
    List(Vec<SlotValue>),
    Map(SlotMap),
}

impl SlotValue {
    /// Null, empty text, empty list or empty map
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    /// ISO-8601 text for temporal variants
    pub fn iso_text(&self) -> Option<String> {
        match self {
            Self::DateTime(dt) => Some(dt.to_rfc3339()),
            Self::NaiveDateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Self::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&SlotMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl Serialize for SlotValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::Text(value) => serializer.serialize_str(value),
            Self::DateTime(_) | Self::NaiveDateTime(_) | Self::Date(_) => {
                serializer.serialize_str(&self.iso_text().unwrap_or_default())
            }
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(map) => serializer.collect_map(map),
        }
    }
}

impl From<Value> for SlotValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if n.is_u64() {
                    // out of i64 range: keep the exact digits
                    Self::Text(n.to_string())
                } else {
                    n.as_f64()
                        .map_or_else(|| Self::Text(n.to_string()), Self::Float)
                }
            }
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<bool> for SlotValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SlotValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SlotValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for SlotValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SlotValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SlotValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<FixedOffset>> for SlotValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for SlotValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for SlotValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::NaiveDateTime(value)
    }
}

impl From<NaiveDate> for SlotValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<SlotMap> for SlotValue {
    fn from(value: SlotMap) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<SlotValue>> From<Vec<T>> for SlotValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<SlotValue>> From<Option<T>> for SlotValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Builds a [`SlotMap`] from key/value pairs
pub fn slot_map<K, V, I>(pairs: I) -> SlotMap
where
    K: Into<String>,
    V: Into<SlotValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
