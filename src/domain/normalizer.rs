//! Normalizer capability

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::intent::{NormalizedIntent, SlotMap};
use crate::domain::DomainError;

/// Converts raw text plus caller context into an intent, or nothing
///
/// A collaborator overrides the call shapes it supports. Calling a shape it
/// does not support is a usage fault, never a miss.
#[async_trait]
pub trait Normalizer: Send + Sync + Debug {
    /// Blocking form
    fn normalize(
        &self,
        _text: &str,
        _context: Option<&SlotMap>,
    ) -> Result<Option<NormalizedIntent>, DomainError> {
        Err(DomainError::usage(
            "normalizer has no blocking form, use lookup_async",
        ))
    }

    /// Suspension-capable form
    async fn normalize_async(
        &self,
        _text: &str,
        _context: Option<&SlotMap>,
    ) -> Result<Option<NormalizedIntent>, DomainError> {
        Err(DomainError::usage(
            "normalizer has no async form, use lookup",
        ))
    }
}
