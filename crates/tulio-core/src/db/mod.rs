//! Index store
//!
//! SQLite-backed mapping of path → file record → ordered chunks.
//! - the tier lives only on the file row and is joined onto chunks on read
//! - per-file replacement is one transaction
//! - file-backed stores read through a second connection (WAL snapshot)

mod chunks;
mod files;
mod schema;
mod stats;
pub mod vectors;

pub use chunks::{Chunk, NewChunk};
pub use files::{now_timestamp, FileRecord, RecordSummary};
pub use schema::IndexStore;
pub use stats::IndexStats;

use crate::privacy::PrivacyTier;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

impl ToSql for PrivacyTier {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.rank()))
    }
}

impl FromSql for PrivacyTier {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let rank = i64::column_result(value)?;
        PrivacyTier::from_rank(rank).ok_or(FromSqlError::OutOfRange(rank))
    }
}
