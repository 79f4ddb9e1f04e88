//! Retrieval
//!
//! Tier-filtered candidate chunks from the store are scored by a pluggable
//! [`RelevanceScorer`] and the best ones are returned, most relevant first.

mod embedder;
mod retriever;
mod scorer;

pub use embedder::{Embedder, HashedEmbedder};
pub use retriever::{format_context, Retriever};
pub use scorer::{scorer_for, LexicalScorer, RelevanceScorer, VectorScorer};

use crate::db::Chunk;
use serde::Serialize;

/// A chunk with its relevance score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub score: f32,
}

/// Common English stop words ignored when matching
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
    "has", "have", "he", "in", "is", "it", "its", "of", "on", "that",
    "the", "to", "was", "will", "with", "does", "do", "did", "can",
    "could", "should", "would", "what", "where", "when", "why", "how",
    "who", "which", "this", "these", "those", "there", "here",
];

/// Lowercased alphanumeric terms with stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}
