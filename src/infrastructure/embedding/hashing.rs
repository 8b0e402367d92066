//! Feature-hashing embedder

use sha2::{Digest, Sha256};

use crate::domain::embedding::{l2_normalize, Embedder};
use crate::domain::intent::{SlotMap, SlotValue};

pub const DEFAULT_DIMENSIONS: usize = 256;

/// Deterministic, dependency-free embedder
///
/// Hashes the intent label and one `name=value` token per slot into a fixed
/// number of buckets with a signed count, then scales the result to unit
/// length. Intents sharing most slots land close together; it does not know
/// anything about word meaning.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn accumulate(&self, vector: &mut [f32], token: &str) {
        let digest = Sha256::digest(token.as_bytes());
        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);

        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };

        vector[bucket] += sign;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

fn slot_token(name: &str, value: &SlotValue) -> String {
    let encoded = match value {
        SlotValue::Text(text) => text.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    };

    format!("slot:{}={}", name, encoded)
}

impl Embedder for HashingEmbedder {
    fn embed(&self, intent: &str, slots: &SlotMap) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];

        self.accumulate(&mut vector, &format!("intent:{}", intent));

        for (name, value) in slots {
            self.accumulate(&mut vector, &slot_token(name, value));
        }

        l2_normalize(&mut vector);
        vector
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}
