//! Keyword rule normalizer

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::domain::intent::{NormalizedIntent, SlotMap};
use crate::domain::normalizer::Normalizer;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct KeywordRule {
    keyword: String,
    needle: String,
    intent: String,
}

/// Maps text to an intent by case-insensitive keyword containment
///
/// Rules are tried in insertion order and the first keyword found anywhere
/// in the text wins. Matches carry no slots; `meta.matched` holds the
/// keyword.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedNormalizer {
    rules: Vec<KeywordRule>,
}

impl RuleBasedNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a normalizer from ordered `(keyword, intent)` pairs
    pub fn from_rules<K, I>(rules: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: Into<String>,
        I: Into<String>,
    {
        rules
            .into_iter()
            .fold(Self::new(), |normalizer, (keyword, intent)| normalizer.with_rule(keyword, intent))
    }

    /// Appends a rule
    pub fn with_rule(mut self, keyword: impl Into<String>, intent: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.rules.push(KeywordRule {
            needle: keyword.to_lowercase(),
            keyword,
            intent: intent.into(),
        });
        self
    }

    fn match_text(&self, text: &str) -> Option<NormalizedIntent> {
        let lowered = text.to_lowercase();

        self.rules
            .iter()
            .find(|rule| lowered.contains(&rule.needle))
            .map(|rule| {
                trace!(keyword = %rule.keyword, intent = %rule.intent, "Keyword rule matched");
                NormalizedIntent::new(rule.intent.clone())
                    .with_meta("matched", Value::String(rule.keyword.clone()))
            })
    }
}

#[async_trait]
impl Normalizer for RuleBasedNormalizer {
    fn normalize(
        &self,
        text: &str,
        _context: Option<&SlotMap>,
    ) -> Result<Option<NormalizedIntent>, DomainError> {
        Ok(self.match_text(text))
    }

    async fn normalize_async(
        &self,
        text: &str,
        _context: Option<&SlotMap>,
    ) -> Result<Option<NormalizedIntent>, DomainError> {
        Ok(self.match_text(text))
    }
}
