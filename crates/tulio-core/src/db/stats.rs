//! Index statistics

use super::IndexStore;
use crate::error::Result;
use crate::privacy::PrivacyTier;
use std::collections::BTreeMap;

/// Index stats
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IndexStats {
    pub total_files: usize,
    pub total_chunks: usize,
    pub excluded_files: usize,
    /// Indexed (non-excluded) files per tier; every tier is present
    pub per_tier: BTreeMap<PrivacyTier, usize>,
    pub last_indexed: Option<String>,
}

impl IndexStore {
    /// Get index statistics
    pub fn stats(&self) -> Result<IndexStats> {
        self.read(|conn| {
            let total_files: i64 =
                conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
            let total_chunks: i64 =
                conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
            let excluded_files: i64 = conn.query_row(
                "SELECT COUNT(*) FROM files WHERE excluded = 1",
                [],
                |row| row.get(0),
            )?;
            let last_indexed: Option<String> =
                conn.query_row("SELECT MAX(last_indexed) FROM files", [], |row| row.get(0))?;

            let mut per_tier: BTreeMap<PrivacyTier, usize> =
                PrivacyTier::ALL.iter().map(|t| (*t, 0)).collect();
            let mut stmt = conn.prepare(
                "SELECT tier, COUNT(*) FROM files WHERE excluded = 0 GROUP BY tier",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, PrivacyTier>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            for (tier, count) in rows {
                per_tier.insert(tier, count as usize);
            }

            Ok(IndexStats {
                total_files: total_files as usize,
                total_chunks: total_chunks as usize,
                excluded_files: excluded_files as usize,
                per_tier,
                last_indexed,
            })
        })
    }
}
