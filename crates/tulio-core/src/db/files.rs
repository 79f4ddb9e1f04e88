//! File record operations

use super::chunks::{insert_chunks, NewChunk};
use super::IndexStore;
use crate::error::{Result, TulioError};
use crate::index::Fingerprint;
use crate::privacy::PrivacyTier;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// One tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub tier: PrivacyTier,
    pub fingerprint: Fingerprint,
    /// RFC 3339 UTC timestamp of the last write for this file
    pub last_indexed: String,
    pub excluded: bool,
    pub exclusion_reason: Option<String>,
}

impl FileRecord {
    /// Record for a file whose chunks are stored
    pub fn indexed(path: impl Into<String>, tier: PrivacyTier, fingerprint: Fingerprint) -> Self {
        Self {
            path: path.into(),
            tier,
            fingerprint,
            last_indexed: now_timestamp(),
            excluded: false,
            exclusion_reason: None,
        }
    }

    /// Record for a file that is tracked but never chunked
    pub fn excluded(
        path: impl Into<String>,
        tier: PrivacyTier,
        fingerprint: Fingerprint,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            excluded: true,
            exclusion_reason: Some(reason.into()),
            ..Self::indexed(path, tier, fingerprint)
        }
    }

    /// Equal in everything but `last_indexed`
    pub fn same_state(&self, other: &FileRecord) -> bool {
        self.path == other.path
            && self.tier == other.tier
            && self.fingerprint == other.fingerprint
            && self.excluded == other.excluded
            && self.exclusion_reason == other.exclusion_reason
    }
}

/// A record plus how many chunks it owns
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    #[serde(flatten)]
    pub record: FileRecord,
    pub chunk_count: usize,
}

/// Current time, microsecond precision, UTC
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

const RECORD_COLUMNS: &str =
    "path, tier, size, mtime_ns, hash, last_indexed, excluded, exclusion_reason";

fn record_from_row(row: &Row) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        path: row.get(0)?,
        tier: row.get(1)?,
        fingerprint: Fingerprint {
            size: row.get::<_, i64>(2)? as u64,
            mtime_ns: row.get(3)?,
            hash: row.get(4)?,
        },
        last_indexed: row.get(5)?,
        excluded: row.get::<_, i64>(6)? != 0,
        exclusion_reason: row.get(7)?,
    })
}

fn write_record(conn: &Connection, record: &FileRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO files (path, tier, size, mtime_ns, hash, last_indexed, excluded, exclusion_reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(path) DO UPDATE SET
             tier = excluded.tier,
             size = excluded.size,
             mtime_ns = excluded.mtime_ns,
             hash = excluded.hash,
             last_indexed = excluded.last_indexed,
             excluded = excluded.excluded,
             exclusion_reason = excluded.exclusion_reason",
        params![
            record.path,
            record.tier,
            record.fingerprint.size as i64,
            record.fingerprint.mtime_ns,
            record.fingerprint.hash,
            record.last_indexed,
            record.excluded as i64,
            record.exclusion_reason,
        ],
    )?;
    Ok(())
}

impl IndexStore {
    /// Replace a file's record and its whole chunk set in one transaction
    ///
    /// On any failure nothing changes: readers see either the old or the new
    /// chunk set, never a mixture.
    pub fn upsert(&self, record: &FileRecord, chunks: &[NewChunk]) -> Result<()> {
        if record.excluded && !chunks.is_empty() {
            return Err(TulioError::Store(format!(
                "refusing to store {} chunks for excluded file {}",
                chunks.len(),
                record.path
            )));
        }

        let mut conn = self.writer()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM chunks WHERE path = ?1", params![record.path])?;
        write_record(&tx, record)?;
        insert_chunks(&tx, &record.path, chunks)?;
        tx.commit()?;

        tracing::debug!(
            "Stored {} ({}, {} chunks)",
            record.path,
            record.tier,
            chunks.len()
        );
        Ok(())
    }

    /// Flag a file as excluded and purge its chunks
    ///
    /// Returns false when no record exists for `path`.
    pub fn mark_excluded(&self, path: &str, reason: &str) -> Result<bool> {
        let mut conn = self.writer()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM chunks WHERE path = ?1", params![path])?;
        let updated = tx.execute(
            "UPDATE files SET excluded = 1, exclusion_reason = ?2, last_indexed = ?3
             WHERE path = ?1",
            params![path, reason, now_timestamp()],
        )?;
        tx.commit()?;
        Ok(updated > 0)
    }

    /// Metadata-only update for a file whose content hash did not change
    pub fn refresh_fingerprint(&self, path: &str, fingerprint: &Fingerprint) -> Result<bool> {
        let conn = self.writer()?;
        let updated = conn.execute(
            "UPDATE files SET size = ?2, mtime_ns = ?3, hash = ?4 WHERE path = ?1",
            params![
                path,
                fingerprint.size as i64,
                fingerprint.mtime_ns,
                fingerprint.hash
            ],
        )?;
        Ok(updated > 0)
    }

    /// Delete a record; its chunks go with it
    pub fn remove(&self, path: &str) -> Result<bool> {
        let conn = self.writer()?;
        let deleted = conn.execute("DELETE FROM files WHERE path = ?1", params![path])?;
        Ok(deleted > 0)
    }

    /// Point lookup
    pub fn get_record(&self, path: &str) -> Result<Option<FileRecord>> {
        self.read(|conn| {
            let sql = format!("SELECT {RECORD_COLUMNS} FROM files WHERE path = ?1");
            Ok(conn
                .query_row(&sql, params![path], record_from_row)
                .optional()?)
        })
    }

    /// Every record, ordered by path
    pub fn records(&self) -> Result<Vec<FileRecord>> {
        self.read(|conn| {
            let sql = format!("SELECT {RECORD_COLUMNS} FROM files ORDER BY path");
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([], record_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(records)
        })
    }

    /// Snapshot of every record with its chunk count
    pub fn get_all(&self) -> Result<Vec<RecordSummary>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT f.path, f.tier, f.size, f.mtime_ns, f.hash, f.last_indexed,
                        f.excluded, f.exclusion_reason,
                        (SELECT COUNT(*) FROM chunks c WHERE c.path = f.path)
                 FROM files f
                 ORDER BY f.path",
            )?;
            let summaries = stmt
                .query_map([], |row| {
                    Ok(RecordSummary {
                        record: record_from_row(row)?,
                        chunk_count: row.get::<_, i64>(8)? as usize,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(summaries)
        })
    }
}
