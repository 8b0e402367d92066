//! Cache key generation
//!
//! The key text is the one externally stable artifact of the crate. Its
//! layout is fixed:
//!
//! `artifact=<type>|intent=<intent>|slots=<json>|scope=<json>|schema_v=<version>`
//!
//! where both JSON fragments are compact, key-sorted and ASCII-only.

use std::fmt::Debug;
use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::domain::artifact::CacheOptions;
use crate::domain::intent::{canonicalize_mapping, SlotMap};

/// Trait for generating cache keys from key parameters
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates a cache key from the given components
    fn generate(&self, params: &CacheKeyParams) -> String;

    /// Generates a key with a namespace prefix
    fn generate_with_namespace(&self, namespace: &str, params: &CacheKeyParams) -> String {
        format!("{}:{}", namespace, self.generate(params))
    }
}

/// Parameters for cache key generation
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKeyParams {
    pub intent: String,
    pub slots: SlotMap,
    /// `None` is keyed like an empty scope
    pub scope: Option<SlotMap>,
    pub artifact_type: String,
    pub schema_version: String,
}

impl CacheKeyParams {
    /// Creates key parameters with the default artifact type and schema version
    pub fn new(intent: impl Into<String>) -> Self {
        let defaults = CacheOptions::default();

        Self {
            intent: intent.into(),
            slots: SlotMap::new(),
            scope: None,
            artifact_type: defaults.artifact_type,
            schema_version: defaults.schema_version,
        }
    }

    /// Creates key parameters using the artifact type and schema version of `options`
    pub fn from_options(
        intent: impl Into<String>,
        slots: SlotMap,
        scope: Option<SlotMap>,
        options: &CacheOptions,
    ) -> Self {
        Self {
            intent: intent.into(),
            slots,
            scope,
            artifact_type: options.artifact_type.clone(),
            schema_version: options.schema_version.clone(),
        }
    }

    pub fn with_slots(mut self, slots: SlotMap) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_scope(mut self, scope: SlotMap) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_artifact_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self
    }

    pub fn with_schema_version(mut self, schema_version: impl Into<String>) -> Self {
        self.schema_version = schema_version.into();
        self
    }
}

/// Default key generator producing the pipe-delimited key layout
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentKeyGenerator;

impl IntentKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CacheKeyGenerator for IntentKeyGenerator {
    fn generate(&self, params: &CacheKeyParams) -> String {
        let slots = canonicalize_mapping(&params.slots, true);
        let scope = params
            .scope
            .as_ref()
            .map(|scope| canonicalize_mapping(scope, false))
            .unwrap_or_default();

        format!(
            "artifact={}|intent={}|slots={}|scope={}|schema_v={}",
            params.artifact_type,
            params.intent,
            encode_compact(&slots),
            encode_compact(&scope),
            params.schema_version
        )
    }
}

/// Builds the cache key for one intent/slots/scope combination
pub fn build_cache_key(
    intent: &str,
    slots: &SlotMap,
    scope: Option<&SlotMap>,
    artifact_type: &str,
    schema_version: &str,
) -> String {
    let params = CacheKeyParams {
        intent: intent.to_string(),
        slots: slots.clone(),
        scope: scope.cloned(),
        artifact_type: artifact_type.to_string(),
        schema_version: schema_version.to_string(),
    };

    IntentKeyGenerator.generate(&params)
}

/// Compact, key-sorted, ASCII-only JSON
fn encode_compact(mapping: &SlotMap) -> String {
    let mut buf = Vec::new();
    let written = {
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
        mapping.serialize(&mut serializer)
    };

    written
        .ok()
        .and_then(|_| String::from_utf8(buf).ok())
        .unwrap_or_else(|| "{}".to_string())
}

/// Compact formatter escaping every non-ASCII character as `\uXXXX`
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];

        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units).iter() {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }

        Ok(())
    }
}
