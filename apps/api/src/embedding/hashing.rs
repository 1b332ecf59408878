//! Feature-hashing embedder: bag of lowercased words hashed into fixed buckets.
//!
//! Components are non-negative term counts, L2-normalized, so cosine similarity
//! between two outputs always lies in `0.0..=1.0`. Stable across processes.

use async_trait::async_trait;

use super::{normalize, EmbeddingError, EmbeddingProvider, DEFAULT_DIMENSION};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// A zero `dimension` is bumped to 1 so every output is a valid vector.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut buckets = vec![0.0_f32; self.dimension];
        for word in words(text) {
            let bucket = (fnv1a(word.as_bytes()) % self.dimension as u64) as usize;
            buckets[bucket] += 1.0;
        }
        normalize(&buckets)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed(text))
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}
