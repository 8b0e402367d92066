//! Closure-backed normalizer

use std::fmt;

use async_trait::async_trait;

use crate::domain::intent::{NormalizedIntent, SlotMap};
use crate::domain::normalizer::Normalizer;
use crate::domain::DomainError;

/// Wraps a synchronous closure; serves both call shapes
pub struct CallableNormalizer<F> {
    f: F,
}

impl<F> CallableNormalizer<F>
where
    F: Fn(&str, Option<&SlotMap>) -> Result<Option<NormalizedIntent>, DomainError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for CallableNormalizer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableNormalizer").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Normalizer for CallableNormalizer<F>
where
    F: Fn(&str, Option<&SlotMap>) -> Result<Option<NormalizedIntent>, DomainError> + Send + Sync,
{
    fn normalize(
        &self,
        text: &str,
        context: Option<&SlotMap>,
    ) -> Result<Option<NormalizedIntent>, DomainError> {
        (self.f)(text, context)
    }

    async fn normalize_async(
        &self,
        text: &str,
        context: Option<&SlotMap>,
    ) -> Result<Option<NormalizedIntent>, DomainError> {
        (self.f)(text, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intent::{slot_map, SlotValue};

    #[test]
    fn test_passes_text_and_context() {
        let normalizer = CallableNormalizer::new(|text: &str, context: Option<&SlotMap>| {
            let lang = context
                .and_then(|c| c.get("lang"))
                .cloned()
                .unwrap_or(SlotValue::Null);
            Ok(Some(NormalizedIntent::new(text).with_slot("lang", lang)))
        });

        let context = slot_map([("lang", "en")]);
        let result = normalizer.normalize("faq", Some(&context)).unwrap().unwrap();

        assert_eq!(result.intent, "faq");
        assert_eq!(result.slots.get("lang"), Some(&SlotValue::from("en")));
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let normalizer = CallableNormalizer::new(|_: &str, _: Option<&SlotMap>| {
            Err(DomainError::normalizer("backend down"))
        });

        let result = normalizer.normalize_async("x", None).await;
        assert!(matches!(result, Err(DomainError::Normalizer { .. })));
    }
}
