//! Indexing pipeline
//!
//! File scanning, fingerprinting, chunking, and the coordinator that ties
//! them to the store.

mod cancel;
mod chunker;
mod coordinator;
mod fingerprint;
mod scanner;

pub use cancel::CancellationToken;
pub use chunker::{chunk, prepare_content, TextChunk, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use coordinator::{
    CleanupReport, FileError, IndexStatus, Indexer, IndexingReport, REASON_EXCLUDED_BY_RULE,
    REASON_MISSING, REASON_TIER_LIMIT,
};
pub use fingerprint::{hash_content, mtime_ns, Fingerprint};
pub use scanner::{Scan, ScanOptions, ScanPlan, ScannedFile};
