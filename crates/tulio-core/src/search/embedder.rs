//! Local text embeddings

use super::tokenize;

/// Turns text into a fixed-size vector. Must be deterministic.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;

    fn dimensions(&self) -> usize;
}

/// Feature-hashed bag of words
///
/// Each term lands in one of `dimensions` buckets with a sign, both taken
/// from its blake3 digest. The result is L2-normalized.
#[derive(Debug, Clone)]
pub struct HashedEmbedder {
    dimensions: usize,
}

impl HashedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Embedder for HashedEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for term in tokenize(text) {
            let digest = blake3::hash(term.as_bytes());
            let bytes = digest.as_bytes();
            let mut index_bytes = [0u8; 8];
            index_bytes.copy_from_slice(&bytes[..8]);
            let index = (u64::from_le_bytes(index_bytes) % self.dimensions as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
