//! Engine facade
//!
//! Bundles the store, the indexing coordinator and the retriever behind the
//! operations external callers use.

use crate::config::Config;
use crate::db::{IndexStats, IndexStore, RecordSummary};
use crate::error::Result;
use crate::index::{CleanupReport, IndexStatus, Indexer, IndexingReport};
use crate::privacy::PrivacyTier;
use crate::search::{Retriever, ScoredChunk};
use std::sync::Arc;
use std::time::Duration;

/// Privacy-aware indexing and retrieval over one configuration
pub struct Engine {
    config: Config,
    store: Arc<IndexStore>,
    indexer: Indexer,
    retriever: Retriever,
}

impl Engine {
    /// Open the store at the configured location
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let store = IndexStore::open(config.database_path())?;
        Self::with_store(config, Arc::new(store))
    }

    /// Engine over a throwaway in-memory store
    pub fn open_in_memory(config: Config) -> Result<Self> {
        config.validate()?;
        Self::with_store(config, Arc::new(IndexStore::open_in_memory()?))
    }

    pub fn with_store(config: Config, store: Arc<IndexStore>) -> Result<Self> {
        let indexer = Indexer::new(store.clone(), &config)?;
        let retriever = Retriever::from_config(store.clone(), &config.rag);
        Ok(Self {
            config,
            store,
            indexer,
            retriever,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn reindex(&self, force: bool) -> Result<IndexingReport> {
        self.indexer.reindex(force)
    }

    pub fn cleanup(&self) -> Result<CleanupReport> {
        self.indexer.cleanup()
    }

    pub fn stats(&self) -> Result<IndexStats> {
        self.store.stats()
    }

    /// Every record with its chunk count
    pub fn dump(&self) -> Result<Vec<RecordSummary>> {
        self.store.get_all()
    }

    pub fn retrieve(
        &self,
        query: &str,
        max_tier: PrivacyTier,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        self.retriever.retrieve(query, max_tier, top_k)
    }

    pub fn ensure_fresh(&self, max_age: Duration) -> Result<Option<IndexingReport>> {
        self.indexer.ensure_fresh(max_age)
    }

    /// Refresh using `indexing.refresh_interval_secs` as the maximum age
    pub fn ensure_fresh_default(&self) -> Result<Option<IndexingReport>> {
        self.ensure_fresh(Duration::from_secs(
            self.config.indexing.refresh_interval_secs,
        ))
    }

    /// Context block for the LLM client, limited to `max_transmit_tier`
    pub fn context_for_query(&self, query: &str, top_k: usize) -> Result<String> {
        self.retriever
            .context_for_query(query, self.config.privacy.max_transmit_tier, top_k)
    }

    /// Cancel an in-flight reindex; false when idle
    pub fn cancel(&self) -> Result<bool> {
        self.indexer.cancel()
    }

    pub fn status(&self) -> Result<IndexStatus> {
        self.indexer.status()
    }
}
