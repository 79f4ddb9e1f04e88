//! Tulio Core Library
//!
//! Privacy-aware indexing and retrieval over a user's local files, used to
//! ground responses from a hosted LLM.
//!
//! # Features
//! - Four ordered privacy tiers assigned by path, extension and content rules
//! - Incremental reindexing driven by size/mtime/blake3 fingerprints
//! - SQLite store with atomic per-file replacement
//! - Tier-filtered retrieval with pluggable lexical or vector scoring

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod index;
pub mod privacy;
pub mod search;

pub use config::{Config, ScorerKind};
pub use db::{Chunk, FileRecord, IndexStats, IndexStore, RecordSummary};
pub use engine::Engine;
pub use error::{Error, Result, TulioError};
pub use index::{
    CancellationToken, CleanupReport, FileError, Fingerprint, IndexStatus, Indexer,
    IndexingReport,
};
pub use privacy::{PrivacyClassifier, PrivacyTier};
pub use search::{RelevanceScorer, Retriever, ScoredChunk};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "tulio";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "tulio";
