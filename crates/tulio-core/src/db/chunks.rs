//! Chunk storage and tier-filtered reads

use super::vectors::{bytes_to_embedding, embedding_to_bytes};
use super::IndexStore;
use crate::error::Result;
use crate::privacy::PrivacyTier;
use rusqlite::{params, Connection, Row};
use serde::Serialize;

/// A chunk as handed to [`IndexStore::upsert`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewChunk {
    pub seq: usize,
    pub position: usize,
    pub text: String,
    pub embedding: Option<Vec<f32>>,
}

impl NewChunk {
    pub fn new(seq: usize, position: usize, text: impl Into<String>) -> Self {
        Self {
            seq,
            position,
            text: text.into(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A stored chunk, tier and timestamp joined from its file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub path: String,
    pub seq: usize,
    pub position: usize,
    pub text: String,
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    pub tier: PrivacyTier,
    pub indexed_at: String,
}

impl Chunk {
    /// Whether this chunk carries the same content as `other` would store
    pub fn matches(&self, other: &NewChunk) -> bool {
        self.seq == other.seq
            && self.position == other.position
            && self.text == other.text
            && self.embedding == other.embedding
    }
}

const CHUNK_SELECT: &str = "SELECT c.path, c.seq, c.position, c.content, c.embedding,
        f.tier, f.last_indexed
 FROM chunks c
 JOIN files f ON f.path = c.path";

fn chunk_from_row(row: &Row) -> rusqlite::Result<Chunk> {
    let embedding: Option<Vec<u8>> = row.get(4)?;
    Ok(Chunk {
        path: row.get(0)?,
        seq: row.get::<_, i64>(1)? as usize,
        position: row.get::<_, i64>(2)? as usize,
        text: row.get(3)?,
        embedding: embedding.map(|bytes| bytes_to_embedding(&bytes)),
        tier: row.get(5)?,
        indexed_at: row.get(6)?,
    })
}

pub(super) fn insert_chunks(conn: &Connection, path: &str, chunks: &[NewChunk]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO chunks (path, seq, position, content, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for chunk in chunks {
        let embedding = chunk.embedding.as_deref().map(embedding_to_bytes);
        stmt.execute(params![
            path,
            chunk.seq as i64,
            chunk.position as i64,
            chunk.text,
            embedding
        ])?;
    }
    Ok(())
}

impl IndexStore {
    /// Chunks of one file, in order
    pub fn chunks_for(&self, path: &str) -> Result<Vec<Chunk>> {
        self.read(|conn| {
            let sql = format!("{CHUNK_SELECT} WHERE c.path = ?1 ORDER BY c.seq");
            let mut stmt = conn.prepare(&sql)?;
            let chunks = stmt
                .query_map(params![path], chunk_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(chunks)
        })
    }

    /// Chunks of non-excluded files whose tier is at most `max_tier`
    pub fn query_tier_at_most(&self, max_tier: PrivacyTier) -> Result<Vec<Chunk>> {
        self.read(|conn| {
            let sql = format!(
                "{CHUNK_SELECT} WHERE f.excluded = 0 AND f.tier <= ?1 ORDER BY c.path, c.seq"
            );
            let mut stmt = conn.prepare(&sql)?;
            let chunks = stmt
                .query_map(params![max_tier], chunk_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(chunks)
        })
    }
}
