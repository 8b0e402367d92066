//! Embedding domain - embedder trait and vector similarity

mod embedder;
mod similarity;

pub use embedder::{Embedder, FnEmbedder};
pub use similarity::{cosine_similarity, l2_normalize};
