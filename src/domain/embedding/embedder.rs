//! Embedder trait definition

use std::fmt;

use crate::domain::intent::SlotMap;

/// Turns a canonical intent and its slots into a vector
///
/// Identical canonical input should yield identical output; implementations
/// that cannot guarantee this still work but lower the semantic hit rate.
pub trait Embedder: Send + Sync + fmt::Debug {
    fn embed(&self, intent: &str, slots: &SlotMap) -> Vec<f32>;

    /// Output dimensionality, if fixed up front
    fn dimensions(&self) -> Option<usize> {
        None
    }
}

/// Adapts a closure into an [`Embedder`]
pub struct FnEmbedder<F> {
    f: F,
}

impl<F> FnEmbedder<F>
where
    F: Fn(&str, &SlotMap) -> Vec<f32> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnEmbedder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEmbedder").finish_non_exhaustive()
    }
}

impl<F> Embedder for FnEmbedder<F>
where
    F: Fn(&str, &SlotMap) -> Vec<f32> + Send + Sync,
{
    fn embed(&self, intent: &str, slots: &SlotMap) -> Vec<f32> {
        (self.f)(intent, slots)
    }
}
