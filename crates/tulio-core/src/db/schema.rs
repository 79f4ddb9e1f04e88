//! Database schema and initialization

use crate::error::{Result, TulioError};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
-- One row per tracked file; tier is the privacy tier rank (0 = public)
CREATE TABLE IF NOT EXISTS files (
    path TEXT PRIMARY KEY,
    tier INTEGER NOT NULL CHECK (tier BETWEEN 0 AND 3),
    size INTEGER NOT NULL,
    mtime_ns INTEGER NOT NULL,
    hash TEXT NOT NULL,
    last_indexed TEXT NOT NULL,
    excluded INTEGER NOT NULL DEFAULT 0,
    exclusion_reason TEXT
);

CREATE TABLE IF NOT EXISTS chunks (
    path TEXT NOT NULL REFERENCES files(path) ON DELETE CASCADE,
    seq INTEGER NOT NULL,
    position INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB,
    PRIMARY KEY (path, seq)
);

CREATE INDEX IF NOT EXISTS idx_files_tier ON files(excluded, tier);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
"#;

const CREATE_TRIGGERS: &str = r#"
-- Excluded files never own chunks
CREATE TRIGGER IF NOT EXISTS chunks_require_indexed_file
BEFORE INSERT ON chunks
WHEN (SELECT excluded FROM files WHERE path = NEW.path) = 1
BEGIN
    SELECT RAISE(ABORT, 'chunk for excluded file');
END;
"#;

/// Main store handle
///
/// Writes are serialized through one connection. File-backed stores open a
/// second connection for reads so queries see the last committed state
/// while a reindex is writing.
pub struct IndexStore {
    writer: Mutex<Connection>,
    reader: Option<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl IndexStore {
    /// Open (and initialize) a file-backed store
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let writer = Connection::open(path)?;
        let store = Self {
            writer: Mutex::new(writer),
            reader: None,
            path: Some(path.to_path_buf()),
        };
        store.initialize()?;

        let reader = Connection::open(path)?;
        reader.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        tracing::debug!("Opened index store at {}", path.display());
        Ok(Self {
            reader: Some(Mutex::new(reader)),
            ..store
        })
    }

    /// Open in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            writer: Mutex::new(Connection::open_in_memory()?),
            reader: None,
            path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Initialize database schema. Idempotent.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.writer()?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(CREATE_TABLES)?;
        conn.execute_batch(CREATE_TRIGGERS)?;

        let current: Option<i32> = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        match current {
            Some(v) if v > SCHEMA_VERSION => {
                return Err(TulioError::Store(format!(
                    "index schema version {v} is newer than supported version {SCHEMA_VERSION}"
                )));
            }
            Some(v) if v == SCHEMA_VERSION => {}
            _ => {
                conn.execute(
                    "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
        }

        Ok(())
    }

    /// Get schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        self.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .ok())
        })
    }

    /// Database file location, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rows modified through the writer connection since open
    pub fn write_count(&self) -> Result<i64> {
        let conn = self.writer()?;
        Ok(conn.query_row("SELECT total_changes()", [], |row| row.get(0))?)
    }

    pub(crate) fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| TulioError::Store("writer connection lock poisoned".into()))
    }

    /// Run a read against the committed snapshot
    pub(crate) fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        match &self.reader {
            Some(reader) => {
                let conn = reader
                    .lock()
                    .map_err(|_| TulioError::Store("reader connection lock poisoned".into()))?;
                f(&conn)
            }
            None => f(&*self.writer()?),
        }
    }
}
