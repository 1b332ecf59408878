//! Embedding providers: the single seam through which text becomes a vector.
//!
//! The scoring core only sees `dyn EmbeddingProvider`. Two adapters ship here:
//! `HashingEmbedder` (in-process, deterministic) and `HttpEmbedder`
//! (OpenAI-compatible `/embeddings` endpoint).

use async_trait::async_trait;
use thiserror::Error;

pub mod hashing;
pub mod http;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

/// Default dimensionality, matching all-MiniLM-L6-v2.
pub const DEFAULT_DIMENSION: usize = 384;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider unavailable after {retries} retries: {last}")]
    Unavailable {
        retries: u32,
        last: Box<EmbeddingError>,
    },

    #[error("Provider returned no embedding")]
    EmptyResponse,

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    Dimension { expected: usize, actual: usize },
}

/// Turns text into a fixed-length vector.
///
/// Implementations must return the all-zero vector of `dimension()` for empty or
/// whitespace-only text instead of failing, and must be deterministic for identical
/// input within a process.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn dimension(&self) -> usize;

    async fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Scales a vector to unit length. Zero vectors come back unchanged.
pub(crate) fn normalize(vec: &[f32]) -> Vec<f32> {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        vec.to_vec()
    } else {
        vec.iter().map(|x| x / norm).collect()
    }
}
