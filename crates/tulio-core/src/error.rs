//! Error types for tulio

use crate::privacy::PrivacyTier;
use thiserror::Error;

/// Result type alias using TulioError
pub type Result<T> = std::result::Result<T, TulioError>;

/// Error type alias for convenience
pub type Error = TulioError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_INPUT: i32 = 3;
    pub const BUSY: i32 = 4;
    pub const PRIVACY_VIOLATION: i32 = 70;
}

/// Main error type for tulio
///
/// Classification never fails (unmatched paths fall back to the most
/// restrictive tier), so there is no classification variant.
#[derive(Debug, Error)]
pub enum TulioError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot scan {path}: {message}")]
    Scan { path: String, message: String },

    #[error("Cannot chunk {path}: {reason}")]
    Chunk { path: String, reason: String },

    #[error("Privacy violation: chunk from {path} has tier {tier}, above allowed {max_tier}")]
    PrivacyViolation {
        path: String,
        tier: PrivacyTier,
        max_tier: PrivacyTier,
    },

    #[error("A reindex is already in progress")]
    ReindexInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TulioError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::Yaml(_)
            | Self::Regex(_)
            | Self::GlobPattern(_)
            | Self::InvalidInput(_) => exit_codes::INVALID_INPUT,
            Self::ReindexInProgress => exit_codes::BUSY,
            Self::PrivacyViolation { .. } => exit_codes::PRIVACY_VIOLATION,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether the error is confined to a single file and must not abort a reindex
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Scan { .. } | Self::Chunk { .. } | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            TulioError::Config("bad".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(TulioError::ReindexInProgress.exit_code(), exit_codes::BUSY);
        assert_eq!(
            TulioError::Store("disk full".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }

    #[test]
    fn test_per_file_errors() {
        let scan = TulioError::Scan {
            path: "/tmp/a".into(),
            message: "permission denied".into(),
        };
        assert!(scan.is_per_file());
        assert!(!TulioError::Store("x".into()).is_per_file());
        assert!(!TulioError::PrivacyViolation {
            path: "/tmp/a".into(),
            tier: PrivacyTier::Restricted,
            max_tier: PrivacyTier::Public,
        }
        .is_per_file());
    }
}
