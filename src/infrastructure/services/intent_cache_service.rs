//! Intent cache lookup service
//!
//! Runs the lookup pipeline in front of an expensive response generator:
//! normalize the request text, gate it through the intent registry,
//! canonicalize, derive the key and consult the exact tier, then the
//! optional semantic tier.
//!
//! Both entry points ([`IntentCacheService::lookup`] and
//! [`IntentCacheService::lookup_async`]) differ only in how the normalizer
//! is called; everything after that is the shared `resolve` step and never
//! suspends.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::artifact::{Artifact, CacheOptions, ProvenanceSource};
use crate::domain::cache::{CacheKeyGenerator, CacheKeyParams, ExactCache, IntentKeyGenerator};
use crate::domain::intent::{
    Canonicalizer, DefaultCanonicalizer, IntentRegistry, NormalizedIntent, SlotMap,
};
use crate::domain::normalizer::Normalizer;
use crate::domain::semantic_cache::SemanticCache;
use crate::domain::DomainError;

/// Tiered intent cache in front of a response generator
pub struct IntentCacheService {
    normalizer: Arc<dyn Normalizer>,
    registry: Arc<dyn IntentRegistry>,
    exact_cache: Arc<dyn ExactCache>,
    semantic_cache: Option<Arc<dyn SemanticCache>>,
    canonicalizer: Arc<dyn Canonicalizer>,
    key_generator: Arc<dyn CacheKeyGenerator>,
    default_options: CacheOptions,
}

impl fmt::Debug for IntentCacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentCacheService")
            .field("normalizer", &self.normalizer)
            .field("registry", &self.registry)
            .field("exact_cache", &self.exact_cache)
            .field("semantic_cache", &self.semantic_cache.is_some())
            .field("default_options", &self.default_options)
            .finish()
    }
}

impl IntentCacheService {
    pub fn builder() -> IntentCacheServiceBuilder {
        IntentCacheServiceBuilder::new()
    }

    /// Options used when a call passes none
    pub fn default_options(&self) -> &CacheOptions {
        &self.default_options
    }

    /// Blocking lookup
    ///
    /// Returns `Ok(None)` on any miss. Errors are faults only: a normalizer
    /// without a blocking form, a normalizer failure or a backing store
    /// failure.
    #[instrument(skip(self, context, options))]
    pub fn lookup(
        &self,
        text: &str,
        context: Option<&SlotMap>,
        options: Option<&CacheOptions>,
    ) -> Result<Option<Artifact>, DomainError> {
        let options = self.effective_options(options);

        if options.cache_bypass {
            debug!("Cache bypass requested");
            return Ok(None);
        }

        let candidate = self.normalizer.normalize(text, context)?;
        self.resolve(candidate, context, options)
    }

    /// Suspension-capable lookup
    ///
    /// Same decisions and results as [`lookup`](Self::lookup); the normalizer
    /// call is the only await point.
    #[instrument(skip(self, context, options))]
    pub async fn lookup_async(
        &self,
        text: &str,
        context: Option<&SlotMap>,
        options: Option<&CacheOptions>,
    ) -> Result<Option<Artifact>, DomainError> {
        let options = self.effective_options(options);

        if options.cache_bypass {
            debug!("Cache bypass requested");
            return Ok(None);
        }

        let candidate = self.normalizer.normalize_async(text, context).await?;
        self.resolve(candidate, context, options)
    }

    /// Key that a lookup producing `intent` would use
    pub fn cache_key(
        &self,
        intent: &NormalizedIntent,
        context: Option<&SlotMap>,
        options: Option<&CacheOptions>,
    ) -> String {
        let options = self.effective_options(options);
        let slots = self.canonicalizer.canonicalize(&intent.slots, true);

        self.build_key(&intent.intent, slots, context, options)
    }

    /// Writes a freshly generated artifact so later lookups for `intent` hit
    ///
    /// The artifact lands in the exact tier under the same key `lookup`
    /// derives, and in the semantic tier when semantic lookup is enabled and
    /// configured. Returns the key.
    ///
    /// The two tiers are not written atomically. The semantic tier is written
    /// first, so a rejected vector leaves both tiers untouched; an exact tier
    /// failure after that leaves the semantic entry in place.
    pub fn store(
        &self,
        intent: &NormalizedIntent,
        context: Option<&SlotMap>,
        mut artifact: Artifact,
        options: Option<&CacheOptions>,
    ) -> Result<String, DomainError> {
        let options = self.effective_options(options);
        let slots = self.canonicalizer.canonicalize(&intent.slots, true);

        artifact.provenance.source = None;
        artifact.provenance.key = None;
        artifact.provenance.score = None;

        let key = self.build_key(&intent.intent, slots.clone(), context, options);

        if let Some(semantic) = self.semantic_tier(options) {
            let vector = semantic.embed(&intent.intent, &slots);
            semantic.add(vector, artifact.clone())?;
            debug!(key = %key, "Stored artifact in semantic cache");
        }

        self.exact_cache.set(&key, &artifact, None)?;
        debug!(key = %key, "Stored artifact in exact cache");

        Ok(key)
    }

    fn effective_options<'a>(&'a self, options: Option<&'a CacheOptions>) -> &'a CacheOptions {
        options.unwrap_or(&self.default_options)
    }

    fn semantic_tier(&self, options: &CacheOptions) -> Option<&Arc<dyn SemanticCache>> {
        if options.enable_semantic {
            self.semantic_cache.as_ref()
        } else {
            None
        }
    }

    fn build_key(
        &self,
        intent: &str,
        slots: SlotMap,
        context: Option<&SlotMap>,
        options: &CacheOptions,
    ) -> String {
        let scope = options.resolve_scope(context).cloned();
        let params = CacheKeyParams::from_options(intent, slots, scope, options);

        self.key_generator.generate(&params)
    }

    fn resolve(
        &self,
        candidate: Option<NormalizedIntent>,
        context: Option<&SlotMap>,
        options: &CacheOptions,
    ) -> Result<Option<Artifact>, DomainError> {
        let Some(candidate) = candidate else {
            debug!("Normalizer found no intent");
            return Ok(None);
        };

        if !self.registry.is_allowed(&candidate.intent) {
            debug!(intent = %candidate.intent, "Intent not allowed");
            return Ok(None);
        }

        if !self.registry.validate_slots(&candidate.intent, &candidate.slots) {
            debug!(intent = %candidate.intent, "Slot validation failed");
            return Ok(None);
        }

        let slots = self.canonicalizer.canonicalize(&candidate.slots, true);
        let key = self.build_key(&candidate.intent, slots.clone(), context, options);

        if let Some(artifact) = self.exact_cache.get(&key)? {
            debug!(key = %key, "Exact cache hit");
            return Ok(Some(artifact.with_provenance(ProvenanceSource::Cache, key, None)));
        }

        let Some(semantic) = self.semantic_tier(options) else {
            debug!(key = %key, "Exact cache miss, semantic lookup disabled");
            return Ok(None);
        };

        let vector = semantic.embed(&candidate.intent, &slots);

        match semantic.search(&vector, options.min_score)? {
            Some(found) => {
                debug!(key = %key, score = found.score, "Semantic cache hit");
                Ok(Some(found.artifact.with_provenance(
                    ProvenanceSource::Semantic,
                    key,
                    Some(found.score),
                )))
            }
            None => {
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }
}

/// Builder for [`IntentCacheService`]
#[derive(Default)]
pub struct IntentCacheServiceBuilder {
    normalizer: Option<Arc<dyn Normalizer>>,
    registry: Option<Arc<dyn IntentRegistry>>,
    exact_cache: Option<Arc<dyn ExactCache>>,
    semantic_cache: Option<Arc<dyn SemanticCache>>,
    canonicalizer: Option<Arc<dyn Canonicalizer>>,
    key_generator: Option<Arc<dyn CacheKeyGenerator>>,
    default_options: CacheOptions,
}

impl IntentCacheServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn registry(mut self, registry: Arc<dyn IntentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn exact_cache(mut self, exact_cache: Arc<dyn ExactCache>) -> Self {
        self.exact_cache = Some(exact_cache);
        self
    }

    pub fn semantic_cache(mut self, semantic_cache: Arc<dyn SemanticCache>) -> Self {
        self.semantic_cache = Some(semantic_cache);
        self
    }

    /// Overrides the shared [`DefaultCanonicalizer`]
    pub fn canonicalizer(mut self, canonicalizer: Arc<dyn Canonicalizer>) -> Self {
        self.canonicalizer = Some(canonicalizer);
        self
    }

    /// Overrides [`IntentKeyGenerator`]
    pub fn key_generator(mut self, key_generator: Arc<dyn CacheKeyGenerator>) -> Self {
        self.key_generator = Some(key_generator);
        self
    }

    pub fn default_options(mut self, options: CacheOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn build(self) -> Result<IntentCacheService, DomainError> {
        let normalizer = self
            .normalizer
            .ok_or_else(|| DomainError::configuration("IntentCacheService requires a normalizer"))?;
        let registry = self
            .registry
            .ok_or_else(|| DomainError::configuration("IntentCacheService requires a registry"))?;
        let exact_cache = self.exact_cache.ok_or_else(|| {
            DomainError::configuration("IntentCacheService requires an exact cache")
        })?;

        Ok(IntentCacheService {
            normalizer,
            registry,
            exact_cache,
            semantic_cache: self.semantic_cache,
            canonicalizer: self
                .canonicalizer
                .unwrap_or_else(|| Arc::new(DefaultCanonicalizer::new())),
            key_generator: self
                .key_generator
                .unwrap_or_else(|| Arc::new(IntentKeyGenerator::new())),
            default_options: self.default_options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{build_cache_key, MockExactCache};
    use crate::domain::embedding::FnEmbedder;
    use crate::domain::intent::{slot_map, SlotValue};
    use crate::domain::normalizer::mock::{MockNormalizer, Shape};
    use crate::domain::semantic_cache::{MockSemanticCache, SemanticMatch};
    use crate::infrastructure::cache::InMemoryExactCache;
    use crate::infrastructure::registry::SimpleIntentRegistry;
    use crate::infrastructure::semantic_cache::InMemorySemanticCache;
    use serde_json::json;

    fn faq_registry() -> Arc<SimpleIntentRegistry> {
        Arc::new(SimpleIntentRegistry::new().allow("faq"))
    }

    fn answer(text: &str) -> Artifact {
        Artifact::new("intent_cache", json!({ "answer": text }), "v1")
    }

    fn faq_key(scope: Option<&SlotMap>) -> String {
        build_cache_key("faq", &SlotMap::new(), scope, "intent_cache", "v1")
    }

    fn service(
        normalizer: MockNormalizer,
        exact: impl ExactCache + 'static,
        semantic: Option<Arc<dyn SemanticCache>>,
    ) -> IntentCacheService {
        let mut builder = IntentCacheService::builder()
            .normalizer(Arc::new(normalizer))
            .registry(faq_registry())
            .exact_cache(Arc::new(exact));

        if let Some(semantic) = semantic {
            builder = builder.semantic_cache(semantic);
        }

        builder.build().unwrap()
    }

    fn seeded_exact(key: String, artifact: Artifact) -> MockExactCache {
        let mut exact = MockExactCache::new();
        exact
            .expect_get()
            .withf(move |k: &str| k == key)
            .returning(move |_| Ok(Some(artifact.clone())));
        exact
    }

    fn empty_exact() -> MockExactCache {
        let mut exact = MockExactCache::new();
        exact.expect_get().returning(|_| Ok(None));
        exact
    }

    fn semantic_hit(score: f32) -> MockSemanticCache {
        let mut semantic = MockSemanticCache::new();
        semantic.expect_embed().returning(|_, _| vec![1.0, 0.0]);
        semantic
            .expect_search()
            .returning(move |_, _| Ok(Some(SemanticMatch::new(answer("similar"), score))));
        semantic
    }

    #[test]
    fn test_exact_hit() {
        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            seeded_exact(faq_key(None), answer("x")),
            None,
        );

        let result = service.lookup("help", None, None).unwrap().unwrap();

        assert_eq!(result.payload["answer"], "x");
        assert_eq!(result.provenance.source, Some(ProvenanceSource::Cache));
        assert_eq!(result.provenance.key.as_deref(), Some(faq_key(None).as_str()));
        assert_eq!(result.provenance.score, None);
    }

    #[test]
    fn test_semantic_hit_on_exact_miss() {
        let options = CacheOptions::new().with_semantic().with_min_score(0.85);
        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            empty_exact(),
            Some(Arc::new(semantic_hit(0.90))),
        );

        let result = service.lookup("help", None, Some(&options)).unwrap().unwrap();

        assert_eq!(result.payload["answer"], "similar");
        assert_eq!(result.provenance.source, Some(ProvenanceSource::Semantic));
        assert_eq!(result.provenance.score, Some(0.90));
        assert_eq!(result.provenance.key.as_deref(), Some(faq_key(None).as_str()));
    }

    #[test]
    fn test_exact_hit_skips_semantic() {
        let mut semantic = MockSemanticCache::new();
        semantic.expect_embed().never();
        semantic.expect_search().never();

        let options = CacheOptions::new().with_semantic();
        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            seeded_exact(faq_key(None), answer("x")),
            Some(Arc::new(semantic)),
        );

        let result = service.lookup("help", None, Some(&options)).unwrap().unwrap();
        assert_eq!(result.provenance.source, Some(ProvenanceSource::Cache));
    }

    #[test]
    fn test_semantic_disabled_by_options() {
        let mut semantic = MockSemanticCache::new();
        semantic.expect_search().never();
        semantic.expect_embed().never();

        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            empty_exact(),
            Some(Arc::new(semantic)),
        );

        assert!(service.lookup("help", None, None).unwrap().is_none());
    }

    #[test]
    fn test_semantic_enabled_without_semantic_cache() {
        let options = CacheOptions::new().with_semantic();
        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            empty_exact(),
            None,
        );

        assert!(service.lookup("help", None, Some(&options)).unwrap().is_none());
    }

    #[test]
    fn test_semantic_below_threshold_misses() {
        let mut semantic = MockSemanticCache::new();
        semantic.expect_embed().returning(|_, _| vec![1.0, 0.0]);
        semantic
            .expect_search()
            .withf(|_, min_score| *min_score == 0.95)
            .returning(|_, _| Ok(None));

        let options = CacheOptions::new().with_semantic().with_min_score(0.95);
        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            empty_exact(),
            Some(Arc::new(semantic)),
        );

        assert!(service.lookup("help", None, Some(&options)).unwrap().is_none());
    }

    #[test]
    fn test_bypass_returns_none_without_work() {
        let normalizer = Arc::new(MockNormalizer::returning(NormalizedIntent::new("faq")));
        let mut exact = MockExactCache::new();
        exact.expect_get().never();

        let service = IntentCacheService::builder()
            .normalizer(normalizer.clone())
            .registry(faq_registry())
            .exact_cache(Arc::new(exact))
            .build()
            .unwrap();

        let options = CacheOptions::new().bypass();
        assert!(service.lookup("help", None, Some(&options)).unwrap().is_none());
        assert_eq!(normalizer.calls(), 0);
    }

    #[test]
    fn test_bypass_from_default_options() {
        let service = IntentCacheService::builder()
            .normalizer(Arc::new(MockNormalizer::returning(NormalizedIntent::new("faq"))))
            .registry(faq_registry())
            .exact_cache(Arc::new(seeded_exact(faq_key(None), answer("x"))))
            .default_options(CacheOptions::new().bypass())
            .build()
            .unwrap();

        assert!(service.lookup("help", None, None).unwrap().is_none());
        assert!(service
            .lookup("help", None, Some(&CacheOptions::new()))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_normalizer_miss() {
        let mut exact = MockExactCache::new();
        exact.expect_get().never();

        let service = service(MockNormalizer::new(Shape::Both), exact, None);

        assert!(service.lookup("gibberish", None, None).unwrap().is_none());
    }

    #[test]
    fn test_disallowed_intent_misses_even_when_cached() {
        let exact = InMemoryExactCache::new();
        let key = build_cache_key("weather", &SlotMap::new(), None, "intent_cache", "v1");
        exact.set(&key, &answer("sunny"), None).unwrap();

        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("weather")),
            exact,
            None,
        );

        assert!(service.lookup("rain?", None, None).unwrap().is_none());
    }

    #[test]
    fn test_required_slot_missing_misses() {
        let mut exact = MockExactCache::new();
        exact.expect_get().never();

        let service = IntentCacheService::builder()
            .normalizer(Arc::new(MockNormalizer::returning(NormalizedIntent::new("faq"))))
            .registry(Arc::new(
                SimpleIntentRegistry::new()
                    .allow("faq")
                    .with_required_slots("faq", ["topic"]),
            ))
            .exact_cache(Arc::new(exact))
            .build()
            .unwrap();

        assert!(service.lookup("help", None, None).unwrap().is_none());
    }

    #[test]
    fn test_disallowed_slot_name_misses() {
        let mut exact = MockExactCache::new();
        exact.expect_get().never();

        let service = IntentCacheService::builder()
            .normalizer(Arc::new(MockNormalizer::returning(
                NormalizedIntent::new("faq").with_slot("user_id", "u1"),
            )))
            .registry(Arc::new(
                SimpleIntentRegistry::new()
                    .allow("faq")
                    .with_allowed_slots("faq", ["topic"]),
            ))
            .exact_cache(Arc::new(exact))
            .build()
            .unwrap();

        assert!(service.lookup("help", None, None).unwrap().is_none());
    }

    #[test]
    fn test_slots_are_canonicalized_before_keying() {
        let intent = NormalizedIntent::new("faq")
            .with_slot("topic", "billing")
            .with_slot("empty", "")
            .with_slot("missing", SlotValue::Null);
        let key = build_cache_key(
            "faq",
            &slot_map([("topic", "billing")]),
            None,
            "intent_cache",
            "v1",
        );

        let service = service(
            MockNormalizer::returning(intent),
            seeded_exact(key, answer("x")),
            None,
        );

        assert!(service.lookup("billing help", None, None).unwrap().is_some());
    }

    #[test]
    fn test_options_scope_wins_over_context() {
        let context = slot_map([("tenant", "from-context")]);
        let scope = slot_map([("tenant", "from-options")]);
        let options = CacheOptions::new().with_scope(scope.clone());

        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            seeded_exact(faq_key(Some(&scope)), answer("x")),
            None,
        );

        let result = service.lookup("help", Some(&context), Some(&options)).unwrap();
        assert!(result.is_some());
    }

    #[test]
    fn test_context_used_as_scope_when_options_have_none() {
        let context = slot_map([("tenant", "acme")]);

        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            seeded_exact(faq_key(Some(&context)), answer("x")),
            None,
        );

        assert!(service.lookup("help", Some(&context), None).unwrap().is_some());
    }

    #[test]
    fn test_empty_scope_falls_back_to_context() {
        let context = slot_map([("tenant", "acme")]);
        let options = CacheOptions::new().with_scope(SlotMap::new());

        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            seeded_exact(faq_key(Some(&context)), answer("x")),
            None,
        );

        assert!(service
            .lookup("help", Some(&context), Some(&options))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_embedding_ignores_scope() {
        let embedded = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = embedded.clone();

        let mut semantic = MockSemanticCache::new();
        semantic.expect_embed().returning(move |intent, slots| {
            seen.lock().unwrap().push((intent.to_string(), slots.clone()));
            vec![1.0, 0.0]
        });
        semantic
            .expect_search()
            .returning(|_, _| Ok(Some(SemanticMatch::new(answer("x"), 0.99))));

        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            empty_exact(),
            Some(Arc::new(semantic)),
        );

        let tenant_a = CacheOptions::new().with_semantic().with_scope(slot_map([("tenant", "a")]));
        let tenant_b = CacheOptions::new().with_semantic().with_scope(slot_map([("tenant", "b")]));

        let a = service.lookup("help", None, Some(&tenant_a)).unwrap().unwrap();
        let b = service.lookup("help", None, Some(&tenant_b)).unwrap().unwrap();

        assert_ne!(a.provenance.key, b.provenance.key);
        let calls = embedded.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn test_exact_backend_error_propagates() {
        let mut exact = MockExactCache::new();
        exact
            .expect_get()
            .returning(|_| Err(DomainError::cache("connection reset")));

        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            exact,
            None,
        );

        let result = service.lookup("help", None, None);
        assert!(matches!(result, Err(DomainError::Cache { .. })));
    }

    #[test]
    fn test_semantic_backend_error_propagates() {
        let mut semantic = MockSemanticCache::new();
        semantic.expect_embed().returning(|_, _| vec![1.0]);
        semantic
            .expect_search()
            .returning(|_, _| Err(DomainError::internal("index unavailable")));

        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            empty_exact(),
            Some(Arc::new(semantic)),
        );

        let options = CacheOptions::new().with_semantic();
        assert!(service.lookup("help", None, Some(&options)).is_err());
    }

    #[test]
    fn test_normalizer_error_propagates() {
        let normalizer =
            MockNormalizer::new(Shape::Both).with_error(DomainError::cancelled("caller gave up"));
        let service = service(normalizer, empty_exact(), None);

        let result = service.lookup("help", None, None);
        assert!(matches!(result, Err(DomainError::Cancelled { .. })));
    }

    #[test]
    fn test_async_only_normalizer_on_blocking_path_is_usage_fault() {
        let normalizer =
            MockNormalizer::new(Shape::Async).with_result(NormalizedIntent::new("faq"));
        let service = service(normalizer, empty_exact(), None);

        let err = service.lookup("help", None, None).unwrap_err();
        assert!(err.is_usage());
    }

    #[tokio::test]
    async fn test_blocking_only_normalizer_on_async_path_is_usage_fault() {
        let normalizer =
            MockNormalizer::new(Shape::Blocking).with_result(NormalizedIntent::new("faq"));
        let service = service(normalizer, empty_exact(), None);

        let err = service.lookup_async("help", None, None).await.unwrap_err();
        assert!(err.is_usage());
    }

    #[tokio::test]
    async fn test_async_lookup_matches_blocking_lookup() {
        let service = service(
            MockNormalizer::returning(NormalizedIntent::new("faq")),
            seeded_exact(faq_key(None), answer("x")),
            None,
        );

        let blocking = service.lookup("help", None, None).unwrap();
        let suspending = service.lookup_async("help", None, None).await.unwrap();

        assert!(blocking.is_some());
        assert_eq!(blocking, suspending);
    }

    #[test]
    fn test_build_requires_collaborators() {
        let missing_normalizer = IntentCacheService::builder()
            .registry(faq_registry())
            .exact_cache(Arc::new(InMemoryExactCache::new()))
            .build();
        assert!(matches!(missing_normalizer, Err(DomainError::Configuration { .. })));

        let missing_cache = IntentCacheService::builder()
            .normalizer(Arc::new(MockNormalizer::new(Shape::Both)))
            .registry(faq_registry())
            .build();
        assert!(matches!(missing_cache, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_store_then_lookup_with_real_backends() {
        let exact = Arc::new(InMemoryExactCache::new());
        let semantic = Arc::new(InMemorySemanticCache::new(Arc::new(FnEmbedder::new(
            |_: &str, slots: &SlotMap| {
                if slots.contains_key("topic") { vec![1.0, 0.2] } else { vec![1.0, 0.0] }
            },
        ))));

        let service = IntentCacheService::builder()
            .normalizer(Arc::new(MockNormalizer::returning(NormalizedIntent::new("faq"))))
            .registry(faq_registry())
            .exact_cache(exact.clone())
            .semantic_cache(semantic.clone())
            .default_options(CacheOptions::new().with_semantic().with_min_score(0.9))
            .build()
            .unwrap();

        let intent = NormalizedIntent::new("faq").with_slot("topic", "billing");
        let key = service.store(&intent, None, answer("stored"), None).unwrap();

        assert_eq!(key, service.cache_key(&intent, None, None));
        assert_eq!(semantic.len(), 1);

        // The normalizer yields "faq" without slots, so only the semantic tier can match.
        let result = service.lookup("help", None, None).unwrap().unwrap();
        assert_eq!(result.payload["answer"], "stored");
        assert_eq!(result.provenance.source, Some(ProvenanceSource::Semantic));

        let stored = exact.get(&key).unwrap().unwrap();
        assert!(stored.provenance.is_empty());
    }

    #[test]
    fn test_store_rejected_vector_leaves_exact_tier_untouched() {
        let exact = Arc::new(InMemoryExactCache::new());
        let semantic = Arc::new(
            InMemorySemanticCache::new(Arc::new(FnEmbedder::new(|_: &str, _: &SlotMap| {
                vec![1.0, 0.0]
            })))
            .with_dimensions(3),
        );

        let service = IntentCacheService::builder()
            .normalizer(Arc::new(MockNormalizer::returning(NormalizedIntent::new("faq"))))
            .registry(faq_registry())
            .exact_cache(exact.clone())
            .semantic_cache(semantic.clone())
            .default_options(CacheOptions::new().with_semantic())
            .build()
            .unwrap();

        let intent = NormalizedIntent::new("faq");
        let result = service.store(&intent, None, answer("stored"), None);

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(semantic.is_empty());
        assert!(exact
            .get(&service.cache_key(&intent, None, None))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_store_clears_lookup_provenance() {
        let exact = Arc::new(InMemoryExactCache::new());
        let service = IntentCacheService::builder()
            .normalizer(Arc::new(MockNormalizer::returning(NormalizedIntent::new("faq"))))
            .registry(faq_registry())
            .exact_cache(exact.clone())
            .build()
            .unwrap();

        let previous = answer("x").with_provenance(ProvenanceSource::Semantic, "old", Some(0.9));
        let key = service
            .store(&NormalizedIntent::new("faq"), None, previous, None)
            .unwrap();

        assert!(exact.get(&key).unwrap().unwrap().provenance.is_empty());

        let result = service.lookup("help", None, None).unwrap().unwrap();
        assert_eq!(result.provenance.source, Some(ProvenanceSource::Cache));
        assert_eq!(result.provenance.key.as_deref(), Some(key.as_str()));
    }

    #[test]
    fn test_cache_key_uses_resolved_scope() {
        let service = service(MockNormalizer::new(Shape::Both), empty_exact(), None);
        let context = slot_map([("tenant", "acme")]);

        assert_eq!(
            service.cache_key(&NormalizedIntent::new("faq"), Some(&context), None),
            faq_key(Some(&context))
        );
    }
}
