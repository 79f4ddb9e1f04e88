//! Tier-filtered top-k retrieval

use super::scorer::{scorer_for, RelevanceScorer};
use super::ScoredChunk;
use crate::config::RagConfig;
use crate::db::IndexStore;
use crate::error::{Result, TulioError};
use crate::privacy::PrivacyTier;
use std::path::Path;
use std::sync::Arc;

/// Separator between chunks in an LLM context block
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Selects the most relevant chunks a caller is allowed to see
#[derive(Clone)]
pub struct Retriever {
    store: Arc<IndexStore>,
    scorer: Arc<dyn RelevanceScorer>,
    min_score: f32,
}

impl Retriever {
    pub fn new(store: Arc<IndexStore>, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self {
            store,
            scorer,
            min_score: 0.0,
        }
    }

    /// Retriever with the scorer and threshold from configuration
    pub fn from_config(store: Arc<IndexStore>, config: &RagConfig) -> Self {
        Self::new(store, scorer_for(config)).with_min_score(config.min_score)
    }

    /// Drop chunks scoring at or below `min_score`
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// The `top_k` most relevant chunks whose tier is at most `max_tier`
    ///
    /// Ties go to the most recently indexed chunk, then path, then sequence.
    pub fn retrieve(
        &self,
        query: &str,
        max_tier: PrivacyTier,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let candidates = self.store.query_tier_at_most(max_tier)?;
        let candidate_count = candidates.len();
        let scores = self.scorer.score_all(query, &candidates);

        let mut results: Vec<ScoredChunk> = candidates
            .into_iter()
            .zip(scores)
            .filter(|(_, score)| score.is_finite() && *score > self.min_score)
            .map(|(chunk, score)| ScoredChunk { chunk, score })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.chunk.indexed_at.cmp(&a.chunk.indexed_at))
                .then_with(|| a.chunk.path.cmp(&b.chunk.path))
                .then_with(|| a.chunk.seq.cmp(&b.chunk.seq))
        });
        results.truncate(top_k);

        enforce_tier(&results, max_tier)?;

        tracing::debug!(
            "Retrieved {} of {} candidate chunks (scorer: {}, max tier: {})",
            results.len(),
            candidate_count,
            self.scorer.name(),
            max_tier
        );
        Ok(results)
    }

    /// Context block for the LLM client, empty when nothing qualifies
    pub fn context_for_query(
        &self,
        query: &str,
        max_tier: PrivacyTier,
        top_k: usize,
    ) -> Result<String> {
        let chunks = self.retrieve(query, max_tier, top_k)?;
        Ok(format_context(&chunks))
    }
}

/// Last check before chunks leave the engine
pub(crate) fn enforce_tier(chunks: &[ScoredChunk], max_tier: PrivacyTier) -> Result<()> {
    if let Some(leak) = chunks.iter().find(|c| !c.chunk.tier.permits(max_tier)) {
        tracing::error!(
            "Privacy violation: chunk {}#{} has tier {} but max tier is {}; returning nothing",
            leak.chunk.path,
            leak.chunk.seq,
            leak.chunk.tier,
            max_tier
        );
        return Err(TulioError::PrivacyViolation {
            path: leak.chunk.path.clone(),
            tier: leak.chunk.tier,
            max_tier,
        });
    }
    Ok(())
}

/// Render chunks as `from <file name>:\n<text>` blocks
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| {
            let name = Path::new(&c.chunk.path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| c.chunk.path.clone());
            format!("from {}:\n{}", name, c.chunk.text)
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
