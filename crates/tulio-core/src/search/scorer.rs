//! Relevance scoring strategies

use super::embedder::{Embedder, HashedEmbedder};
use super::tokenize;
use crate::config::{RagConfig, ScorerKind};
use crate::db::vectors::cosine_similarity;
use crate::db::Chunk;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Scores how relevant a chunk is to a query. Higher is better.
pub trait RelevanceScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, query: &str, chunk: &Chunk) -> f32;

    /// Score many chunks against one query
    fn score_all(&self, query: &str, chunks: &[Chunk]) -> Vec<f32> {
        chunks.iter().map(|c| self.score(query, c)).collect()
    }
}

/// Build the scorer selected by configuration
pub fn scorer_for(config: &RagConfig) -> Arc<dyn RelevanceScorer> {
    match config.scorer {
        ScorerKind::Lexical => Arc::new(LexicalScorer::default()),
        ScorerKind::Vector => Arc::new(VectorScorer::new(Arc::new(HashedEmbedder::new(
            config.embedding_dims,
        )))),
    }
}

/// Term-frequency match with saturation and length normalization
///
/// Each distinct query term contributes `tf / (tf + k * norm)` where `norm`
/// grows with chunk length; the sum is divided by the number of query terms,
/// so scores stay in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct LexicalScorer {
    k: f32,
    b: f32,
    reference_len: f32,
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self {
            k: 1.2,
            b: 0.75,
            reference_len: 150.0,
        }
    }
}

impl LexicalScorer {
    fn score_terms(&self, query_terms: &BTreeSet<String>, chunk: &Chunk) -> f32 {
        if query_terms.is_empty() {
            return 0.0;
        }

        let tokens = tokenize(&chunk.text);
        if tokens.is_empty() {
            return 0.0;
        }
        let mut tf: HashMap<&str, f32> = HashMap::new();
        for token in &tokens {
            *tf.entry(token.as_str()).or_insert(0.0) += 1.0;
        }

        let norm = 1.0 - self.b + self.b * tokens.len() as f32 / self.reference_len;
        let total: f32 = query_terms
            .iter()
            .filter_map(|term| tf.get(term.as_str()))
            .map(|f| f / (f + self.k * norm))
            .sum();

        total / query_terms.len() as f32
    }
}

impl RelevanceScorer for LexicalScorer {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn score(&self, query: &str, chunk: &Chunk) -> f32 {
        let terms: BTreeSet<String> = tokenize(query).into_iter().collect();
        self.score_terms(&terms, chunk)
    }

    fn score_all(&self, query: &str, chunks: &[Chunk]) -> Vec<f32> {
        let terms: BTreeSet<String> = tokenize(query).into_iter().collect();
        chunks.iter().map(|c| self.score_terms(&terms, c)).collect()
    }
}

/// Cosine similarity between query and chunk embeddings
///
/// Chunks stored without an embedding, or with one of a different size,
/// are embedded on the fly.
#[derive(Clone)]
pub struct VectorScorer {
    embedder: Arc<dyn Embedder>,
}

impl VectorScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    fn score_embedded(&self, query: &[f32], chunk: &Chunk) -> f32 {
        match chunk.embedding.as_deref() {
            Some(stored) if stored.len() == self.embedder.dimensions() => {
                cosine_similarity(query, stored)
            }
            _ => cosine_similarity(query, &self.embedder.embed(&chunk.text)),
        }
    }
}

impl RelevanceScorer for VectorScorer {
    fn name(&self) -> &'static str {
        "vector"
    }

    fn score(&self, query: &str, chunk: &Chunk) -> f32 {
        self.score_embedded(&self.embedder.embed(query), chunk)
    }

    fn score_all(&self, query: &str, chunks: &[Chunk]) -> Vec<f32> {
        let query = self.embedder.embed(query);
        chunks.iter().map(|c| self.score_embedded(&query, c)).collect()
    }
}
