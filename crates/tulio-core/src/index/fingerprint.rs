//! Change fingerprints

use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::time::UNIX_EPOCH;

/// Cheap signature of a file's state
///
/// `size` and `mtime_ns` decide whether the content has to be re-read at
/// all; `hash` decides whether it actually changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub size: u64,
    pub mtime_ns: i64,
    pub hash: String,
}

impl Fingerprint {
    /// Fingerprint of bytes just read from disk
    pub fn from_content(bytes: &[u8], mtime_ns: i64) -> Self {
        Self {
            size: bytes.len() as u64,
            mtime_ns,
            hash: hash_content(bytes),
        }
    }

    /// Whether size and mtime still match, i.e. the hash can be reused
    pub fn matches_metadata(&self, size: u64, mtime_ns: i64) -> bool {
        self.size == size && self.mtime_ns == mtime_ns
    }
}

/// Lowercase hex blake3 digest
pub fn hash_content(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Modification time in integer nanoseconds since the Unix epoch
///
/// Timestamps before the epoch come out negative. Filesystems that cannot
/// report an mtime yield 0, which only costs a re-hash.
pub fn mtime_ns(metadata: &Metadata) -> i64 {
    let Ok(modified) = metadata.modified() else {
        return 0;
    };
    match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_nanos() as i64,
        Err(e) => -(e.duration().as_nanos() as i64),
    }
}
