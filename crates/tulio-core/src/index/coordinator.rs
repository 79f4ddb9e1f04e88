//! Indexing coordinator
//!
//! Drives scan → classify → chunk → store. Each file ends up either stored
//! with its chunks or recorded as excluded with no chunks. Unchanged files
//! cause no writes at all.

use super::cancel::CancellationToken;
use super::chunker::{chunk, prepare_content};
use super::scanner::{ScanOptions, ScannedFile};
use crate::config::{Config, ScorerKind};
use crate::db::{FileRecord, IndexStore, NewChunk};
use crate::error::{Result, TulioError};
use crate::privacy::{PrivacyClassifier, PrivacyTier};
use crate::search::{Embedder, HashedEmbedder};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Exclusion reason for stored files that vanished from disk
pub const REASON_MISSING: &str = "missing";
/// Exclusion reason for stored files now matched by an exclusion rule
pub const REASON_EXCLUDED_BY_RULE: &str = "excluded by rule";
/// Exclusion reason for files classified above `max_indexed_tier`
pub const REASON_TIER_LIMIT: &str = "tier above indexing limit";

/// A per-file problem that did not stop the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: String,
    pub message: String,
}

impl FileError {
    fn new(path: impl Into<String>, err: &TulioError) -> Self {
        Self {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one reindex
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexingReport {
    pub files_scanned: usize,
    /// Files whose chunks were (re)written
    pub files_changed: usize,
    /// Files newly recorded as excluded during this run
    pub files_excluded: usize,
    pub files_unchanged: usize,
    /// Stored files the walk no longer produced
    pub files_missing: usize,
    pub errors: Vec<FileError>,
    pub cancelled: bool,
}

/// Outcome of a cleanup
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub removed_count: usize,
    pub removed_paths: Vec<String>,
}

/// What the coordinator is doing right now
#[derive(Debug, Clone)]
pub enum IndexStatus {
    Idle,
    Indexing {
        token: CancellationToken,
        started_at: DateTime<Utc>,
    },
}

/// Orchestrates indexing runs against one store
pub struct Indexer {
    store: Arc<IndexStore>,
    options: ScanOptions,
    classifier: PrivacyClassifier,
    max_indexed_tier: PrivacyTier,
    chunk_size: usize,
    chunk_overlap: usize,
    embedder: Option<Arc<dyn Embedder>>,
    status: Mutex<IndexStatus>,
    idle: Condvar,
    last_completed: Mutex<Option<Instant>>,
}

/// Resets the status to idle when a run ends, however it ends
struct RunGuard<'a> {
    indexer: &'a Indexer,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut status = match self.indexer.status.lock() {
            Ok(status) => status,
            Err(poisoned) => poisoned.into_inner(),
        };
        *status = IndexStatus::Idle;
        self.indexer.idle.notify_all();
    }
}

impl Indexer {
    pub fn new(store: Arc<IndexStore>, config: &Config) -> Result<Self> {
        let embedder: Option<Arc<dyn Embedder>> = match config.rag.scorer {
            ScorerKind::Vector => Some(Arc::new(HashedEmbedder::new(config.rag.embedding_dims))),
            ScorerKind::Lexical => None,
        };

        Ok(Self {
            store,
            options: ScanOptions::from_config(&config.indexing)?,
            classifier: PrivacyClassifier::from_config(&config.privacy)?,
            max_indexed_tier: config.privacy.max_indexed_tier,
            chunk_size: config.rag.chunk_size,
            chunk_overlap: config.rag.chunk_overlap,
            embedder,
            status: Mutex::new(IndexStatus::Idle),
            idle: Condvar::new(),
            last_completed: Mutex::new(None),
        })
    }

    pub fn status(&self) -> Result<IndexStatus> {
        Ok(self.lock_status()?.clone())
    }

    pub fn is_indexing(&self) -> Result<bool> {
        Ok(matches!(*self.lock_status()?, IndexStatus::Indexing { .. }))
    }

    /// When the last uncancelled reindex finished
    pub fn last_completed(&self) -> Result<Option<Instant>> {
        Ok(*self.lock_last_completed()?)
    }

    /// Ask an in-flight run to stop after the current file
    pub fn cancel(&self) -> Result<bool> {
        match &*self.lock_status()? {
            IndexStatus::Indexing { token, .. } => {
                token.cancel();
                Ok(true)
            }
            IndexStatus::Idle => Ok(false),
        }
    }

    /// Bring the store in line with the filesystem
    ///
    /// With `force`, every file is re-read, re-classified and re-chunked, but
    /// only files whose stored state differs are written.
    pub fn reindex(&self, force: bool) -> Result<IndexingReport> {
        let token = self.begin()?;
        let _guard = RunGuard { indexer: self };

        let report = self.run_reindex(force, &token)?;
        if !report.cancelled {
            *self.lock_last_completed()? = Some(Instant::now());
        }
        Ok(report)
    }

    /// Remove records that are excluded, gone from disk, or now ruled out
    ///
    /// Cancels an in-flight reindex and waits for it first.
    pub fn cleanup(&self) -> Result<CleanupReport> {
        let token = self.begin_exclusive()?;
        let _guard = RunGuard { indexer: self };

        let mut report = CleanupReport::default();
        for record in self.store.records()? {
            if token.is_cancelled() {
                tracing::info!("Cleanup cancelled");
                break;
            }

            let path = Path::new(&record.path);
            let reason = if record.excluded {
                record
                    .exclusion_reason
                    .clone()
                    .unwrap_or_else(|| "excluded".to_string())
            } else if !path.exists() {
                REASON_MISSING.to_string()
            } else if !self.options.is_eligible_path(path) {
                REASON_EXCLUDED_BY_RULE.to_string()
            } else {
                continue;
            };

            if self.store.remove(&record.path)? {
                tracing::debug!("Removed {} ({})", record.path, reason);
                report.removed_paths.push(record.path);
            }
        }

        report.removed_count = report.removed_paths.len();
        tracing::info!("Cleanup removed {} records", report.removed_count);
        Ok(report)
    }

    /// Run an incremental reindex if the last one is older than `max_age`
    ///
    /// Returns `None` when the index is fresh or a run is already in flight.
    pub fn ensure_fresh(&self, max_age: Duration) -> Result<Option<IndexingReport>> {
        if self.is_indexing()? {
            return Ok(None);
        }
        let stale = match *self.lock_last_completed()? {
            Some(at) => at.elapsed() >= max_age,
            None => true,
        };
        if !stale {
            return Ok(None);
        }

        tracing::debug!("Index older than {:?}, refreshing", max_age);
        match self.reindex(false) {
            Ok(report) => Ok(Some(report)),
            Err(TulioError::ReindexInProgress) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn lock_status(&self) -> Result<MutexGuard<'_, IndexStatus>> {
        self.status
            .lock()
            .map_err(|_| TulioError::Store("indexer status lock poisoned".into()))
    }

    fn lock_last_completed(&self) -> Result<MutexGuard<'_, Option<Instant>>> {
        self.last_completed
            .lock()
            .map_err(|_| TulioError::Store("indexer timestamp lock poisoned".into()))
    }

    /// Move to `Indexing`, or fail if a run is already active
    fn begin(&self) -> Result<CancellationToken> {
        let mut status = self.lock_status()?;
        if let IndexStatus::Indexing { started_at, .. } = &*status {
            tracing::debug!("Rejecting reindex, one started at {}", started_at);
            return Err(TulioError::ReindexInProgress);
        }
        let token = CancellationToken::new();
        *status = IndexStatus::Indexing {
            token: token.clone(),
            started_at: Utc::now(),
        };
        Ok(token)
    }

    /// Move to `Indexing`, cancelling and waiting out any active run
    fn begin_exclusive(&self) -> Result<CancellationToken> {
        let mut status = self.lock_status()?;
        while let IndexStatus::Indexing { token, .. } = &*status {
            tracing::info!("Cancelling in-flight reindex");
            token.cancel();
            status = self
                .idle
                .wait(status)
                .map_err(|_| TulioError::Store("indexer status lock poisoned".into()))?;
        }
        let token = CancellationToken::new();
        *status = IndexStatus::Indexing {
            token: token.clone(),
            started_at: Utc::now(),
        };
        Ok(token)
    }

    fn run_reindex(&self, force: bool, token: &CancellationToken) -> Result<IndexingReport> {
        let started = Instant::now();
        tracing::info!("Reindex started (force: {})", force);

        let records: HashMap<String, FileRecord> = self
            .store
            .records()?
            .into_iter()
            .map(|r| (r.path.clone(), r))
            .collect();

        let mut report = IndexingReport::default();
        let mut seen = HashSet::new();
        let mut failed = Vec::new();

        let plan = self
            .options
            .plan(|key| {
                records
                    .get(key)
                    .filter(|r| !needs_revisit(r))
                    .map(|r| r.fingerprint.clone())
            })
            .rehash_all(force);
        let mut scan = plan.iter(token);

        for item in scan.by_ref() {
            match item {
                Ok(file) => {
                    report.files_scanned += 1;
                    seen.insert(file.key.clone());
                    let existing = records.get(&file.key);
                    self.process(file, existing, force, &mut report)?;
                }
                Err(e) if e.is_per_file() => {
                    tracing::warn!("{}", e);
                    let path = match &e {
                        TulioError::Scan { path, .. } => path.clone(),
                        _ => String::new(),
                    };
                    report.errors.push(FileError::new(path.clone(), &e));
                    failed.push(path);
                }
                Err(e) => return Err(e),
            }
        }
        report.cancelled = scan.was_cancelled();

        if !report.cancelled {
            let mut stored: Vec<&FileRecord> = records
                .values()
                .filter(|r| !seen.contains(&r.path) && !needs_revisit(r))
                .collect();
            stored.sort_by(|a, b| a.path.cmp(&b.path));

            for record in stored {
                if token.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                let reason = if !Path::new(&record.path).exists() {
                    REASON_MISSING
                } else if under_failed_path(&record.path, &failed) {
                    tracing::debug!("Keeping {} (scan failed)", record.path);
                    continue;
                } else {
                    REASON_EXCLUDED_BY_RULE
                };
                self.store.mark_excluded(&record.path, reason)?;
                tracing::debug!("Marked {} excluded ({})", record.path, reason);
                report.files_missing += 1;
            }
        }

        tracing::info!(
            "Reindex finished in {:?}: {} scanned, {} changed, {} excluded, {} missing, {} errors{}",
            started.elapsed(),
            report.files_scanned,
            report.files_changed,
            report.files_excluded,
            report.files_missing,
            report.errors.len(),
            if report.cancelled { " (cancelled)" } else { "" }
        );
        Ok(report)
    }

    /// Push one scanned file through classify → chunk → store
    fn process(
        &self,
        file: ScannedFile,
        existing: Option<&FileRecord>,
        force: bool,
        report: &mut IndexingReport,
    ) -> Result<()> {
        if !force {
            if let Some(record) = existing.filter(|r| !needs_revisit(r)) {
                if record.fingerprint == file.fingerprint {
                    report.files_unchanged += 1;
                    return Ok(());
                }
                if record.fingerprint.hash == file.fingerprint.hash {
                    self.store.refresh_fingerprint(&file.key, &file.fingerprint)?;
                    tracing::debug!("Touched {} (content unchanged)", file.key);
                    report.files_unchanged += 1;
                    return Ok(());
                }
            }
        }

        let bytes = match file.content {
            Some(bytes) => bytes,
            None => match std::fs::read(&file.path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    let err = TulioError::Scan {
                        path: file.key.clone(),
                        message: e.to_string(),
                    };
                    tracing::warn!("{}", err);
                    report.errors.push(FileError::new(&file.key, &err));
                    return Ok(());
                }
            },
        };

        // content rules see the whole text
        let decoded = prepare_content(&file.key, &bytes);
        let tier = self
            .classifier
            .classify(&file.path, decoded.as_ref().ok().map(String::as_str));

        let (record, chunks) = match decoded {
            Err(e) => {
                tracing::warn!("{}", e);
                report.errors.push(FileError::new(&file.key, &e));
                let reason = match &e {
                    TulioError::Chunk { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                let record = FileRecord::excluded(&file.key, tier, file.fingerprint, reason);
                (record, Vec::new())
            }
            Ok(_) if tier > self.max_indexed_tier => {
                tracing::debug!(
                    "Not indexing {} ({} exceeds {})",
                    file.key,
                    tier,
                    self.max_indexed_tier
                );
                let record =
                    FileRecord::excluded(&file.key, tier, file.fingerprint, REASON_TIER_LIMIT);
                (record, Vec::new())
            }
            Ok(text) => {
                let chunks = self.build_chunks(&text);
                (FileRecord::indexed(&file.key, tier, file.fingerprint), chunks)
            }
        };

        if let Some(existing) = existing {
            if existing.same_state(&record) && self.stored_chunks_match(&record.path, &chunks)? {
                report.files_unchanged += 1;
                return Ok(());
            }
        }

        self.store.upsert(&record, &chunks)?;
        if record.excluded {
            report.files_excluded += 1;
        } else {
            tracing::debug!("Indexed {} ({}, {} chunks)", record.path, tier, chunks.len());
            report.files_changed += 1;
        }
        Ok(())
    }

    fn build_chunks(&self, text: &str) -> Vec<NewChunk> {
        chunk(text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .map(|c| {
                let embedding = self.embedder.as_ref().map(|e| e.embed(&c.text));
                NewChunk {
                    seq: c.seq,
                    position: c.position,
                    text: c.text,
                    embedding,
                }
            })
            .collect()
    }

    fn stored_chunks_match(&self, path: &str, chunks: &[NewChunk]) -> Result<bool> {
        let stored = self.store.chunks_for(path)?;
        Ok(stored.len() == chunks.len()
            && stored.iter().zip(chunks).all(|(s, c)| s.matches(c)))
    }
}

/// Whether `path` is, or lies below, a path the walk could not read
fn under_failed_path(path: &str, failed: &[String]) -> bool {
    let path = Path::new(path);
    failed
        .iter()
        .any(|f| !f.is_empty() && path.starts_with(f))
}

/// Records whose state depends on the last walk rather than the content
fn needs_revisit(record: &FileRecord) -> bool {
    record.excluded
        && matches!(
            record.exclusion_reason.as_deref(),
            Some(REASON_MISSING) | Some(REASON_EXCLUDED_BY_RULE)
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(configure: impl FnOnce(&mut Config)) -> (TempDir, Arc<IndexStore>, Indexer) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::for_root(dir.path());
        config
            .privacy
            .rules
            .prefixes
            .insert(dir.path().to_string_lossy().to_string(), PrivacyTier::Public);
        configure(&mut config);
        let store = Arc::new(IndexStore::open_in_memory().unwrap());
        let indexer = Indexer::new(store.clone(), &config).unwrap();
        (dir, store, indexer)
    }

    #[test]
    fn test_first_run_indexes_everything() {
        let (dir, store, indexer) = setup(|_| {});
        fs::write(dir.path().join("a.md"), "alpha\n\nbeta").unwrap();
        fs::write(dir.path().join("b.txt"), "gamma").unwrap();

        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.files_changed, 2);
        assert!(report.errors.is_empty());
        assert!(!report.cancelled);
        assert_eq!(store.stats().unwrap().total_files, 2);
        assert!(indexer.last_completed().unwrap().is_some());
        assert!(!indexer.is_indexing().unwrap());
    }

    #[test]
    fn test_touch_refreshes_fingerprint_only() {
        let (dir, store, indexer) = setup(|_| {});
        let path = dir.path().join("a.md");
        fs::write(&path, "same content").unwrap();
        indexer.reindex(false).unwrap();
        let key = path.to_string_lossy().to_string();
        let before = store.get_record(&key).unwrap().unwrap();

        // rewrite identical bytes with a different mtime
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(std::time::SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000))
            .unwrap();
        drop(file);

        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.files_changed, 0);
        assert_eq!(report.files_unchanged, 1);
        let after = store.get_record(&key).unwrap().unwrap();
        assert_ne!(after.fingerprint.mtime_ns, before.fingerprint.mtime_ns);
        assert_eq!(after.fingerprint.hash, before.fingerprint.hash);
        assert_eq!(after.last_indexed, before.last_indexed);
    }

    #[test]
    fn test_tier_above_limit_is_recorded_without_chunks() {
        let (dir, store, indexer) = setup(|c| {
            c.privacy.max_indexed_tier = PrivacyTier::Sensitive;
        });
        fs::write(dir.path().join("keys.md"), "api_key: abc123").unwrap();
        fs::write(dir.path().join("ok.md"), "fine").unwrap();

        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.files_excluded, 1);
        assert_eq!(report.files_changed, 1);

        let key = dir.path().join("keys.md").to_string_lossy().to_string();
        let record = store.get_record(&key).unwrap().unwrap();
        assert!(record.excluded);
        assert_eq!(record.tier, PrivacyTier::Restricted);
        assert_eq!(record.exclusion_reason.as_deref(), Some(REASON_TIER_LIMIT));
        assert!(store.chunks_for(&key).unwrap().is_empty());
    }

    #[test]
    fn test_binary_content_is_excluded_with_reason() {
        let (dir, store, indexer) = setup(|_| {});
        fs::write(dir.path().join("blob.txt"), b"ab\0cd").unwrap();

        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.files_excluded, 1);

        let key = dir.path().join("blob.txt").to_string_lossy().to_string();
        let record = store.get_record(&key).unwrap().unwrap();
        assert!(record.excluded);
        assert_eq!(record.exclusion_reason.as_deref(), Some("binary content"));

        // unchanged on the next run
        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.files_unchanged, 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_deleted_file_marked_missing_then_revived() {
        let (dir, store, indexer) = setup(|_| {});
        let path = dir.path().join("a.md");
        fs::write(&path, "alpha").unwrap();
        indexer.reindex(false).unwrap();
        let key = path.to_string_lossy().to_string();

        fs::remove_file(&path).unwrap();
        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.files_missing, 1);
        let record = store.get_record(&key).unwrap().unwrap();
        assert_eq!(record.exclusion_reason.as_deref(), Some(REASON_MISSING));
        assert!(store.chunks_for(&key).unwrap().is_empty());

        // a second run does not touch it again
        let writes = store.write_count().unwrap();
        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.files_missing, 0);
        assert_eq!(store.write_count().unwrap(), writes);

        fs::write(&path, "alpha").unwrap();
        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.files_changed, 1);
        assert!(!store.get_record(&key).unwrap().unwrap().excluded);
    }

    #[test]
    fn test_large_file_classified_on_full_content() {
        let (dir, store, indexer) = setup(|_| {});
        let mut content = "Ordinary meeting notes about the garden.\n\n".repeat(2000);
        assert!(content.len() > 64 * 1024);
        content.push_str("password = hunter2");
        fs::write(dir.path().join("notes.md"), &content).unwrap();

        indexer.reindex(false).unwrap();
        let key = dir.path().join("notes.md").to_string_lossy().to_string();
        let record = store.get_record(&key).unwrap().unwrap();
        assert_eq!(record.tier, PrivacyTier::Restricted);
        assert!(store
            .query_tier_at_most(PrivacyTier::Sensitive)
            .unwrap()
            .iter()
            .all(|c| !c.text.contains("hunter2")));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_keeps_stored_record() {
        let (dir, store, indexer) = setup(|_| {});
        let path = dir.path().join("a.md");
        fs::write(&path, "alpha").unwrap();
        indexer.reindex(false).unwrap();
        let key = path.to_string_lossy().to_string();
        let before = store.get_record(&key).unwrap().unwrap();

        fs::write(&path, "alpha, rewritten").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o000);
        fs::set_permissions(&path, perms).unwrap();
        if fs::read(&path).is_ok() {
            // permissions are not enforced for this user
            return;
        }

        let report = indexer.reindex(false).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.files_missing, 0);
        assert_eq!(store.get_record(&key).unwrap().unwrap(), before);
        assert_eq!(store.chunks_for(&key).unwrap().len(), 1);
        assert_eq!(indexer.cleanup().unwrap().removed_count, 0);
    }

    #[test]
    fn test_under_failed_path() {
        let failed = vec!["/docs/locked".to_string(), String::new()];
        assert!(under_failed_path("/docs/locked", &failed));
        assert!(under_failed_path("/docs/locked/a.md", &failed));
        assert!(!under_failed_path("/docs/lockedout.md", &failed));
        assert!(!under_failed_path("/docs/open.md", &failed));
        assert!(!under_failed_path("/docs/open.md", &[]));
    }

    #[test]
    fn test_cancelled_run_leaves_missing_files_alone() {
        let (dir, store, indexer) = setup(|_| {});
        let path = dir.path().join("a.md");
        fs::write(&path, "alpha").unwrap();
        indexer.reindex(false).unwrap();
        fs::remove_file(&path).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let report = indexer.run_reindex(false, &token).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.files_scanned, 0);
        assert_eq!(report.files_missing, 0);
        let key = path.to_string_lossy().to_string();
        assert!(!store.get_record(&key).unwrap().unwrap().excluded);
    }

    #[test]
    fn test_overlapping_reindex_rejected() {
        let (_dir, _store, indexer) = setup(|_| {});
        let token = indexer.begin().unwrap();
        let guard = RunGuard { indexer: &indexer };

        assert!(matches!(
            indexer.reindex(false),
            Err(TulioError::ReindexInProgress)
        ));
        assert!(indexer.ensure_fresh(Duration::ZERO).unwrap().is_none());
        assert!(indexer.cancel().unwrap());
        assert!(token.is_cancelled());

        drop(guard);
        assert!(!indexer.is_indexing().unwrap());
        assert!(!indexer.cancel().unwrap());
        assert!(indexer.reindex(false).is_ok());
    }

    #[test]
    fn test_cleanup_cancels_and_waits_for_active_run() {
        let (dir, store, indexer) = setup(|_| {});
        fs::write(dir.path().join("a.md"), "alpha").unwrap();
        indexer.reindex(false).unwrap();
        fs::remove_file(dir.path().join("a.md")).unwrap();

        let token = indexer.begin().unwrap();
        std::thread::scope(|s| {
            let cleanup = s.spawn(|| indexer.cleanup());
            while !token.is_cancelled() {
                std::thread::yield_now();
            }
            // the active run winds down
            drop(RunGuard { indexer: &indexer });
            let report = cleanup.join().unwrap().unwrap();
            assert_eq!(report.removed_count, 1);
        });
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn test_ensure_fresh() {
        let (dir, _store, indexer) = setup(|_| {});
        fs::write(dir.path().join("a.md"), "alpha").unwrap();

        let first = indexer.ensure_fresh(Duration::from_secs(3600)).unwrap();
        assert_eq!(first.unwrap().files_changed, 1);
        assert!(indexer
            .ensure_fresh(Duration::from_secs(3600))
            .unwrap()
            .is_none());
        assert!(indexer.ensure_fresh(Duration::ZERO).unwrap().is_some());
    }

    #[test]
    fn test_vector_scorer_stores_embeddings() {
        let (dir, store, indexer) = setup(|c| {
            c.rag.scorer = ScorerKind::Vector;
            c.rag.embedding_dims = 16;
        });
        fs::write(dir.path().join("a.md"), "alpha beta").unwrap();
        indexer.reindex(false).unwrap();
        let key = dir.path().join("a.md").to_string_lossy().to_string();
        let chunks = store.chunks_for(&key).unwrap();
        assert_eq!(chunks[0].embedding.as_ref().map(|e| e.len()), Some(16));
    }
}
