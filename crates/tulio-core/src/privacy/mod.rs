//! Privacy tiers and classification
//!
//! Every tracked file is tagged with a [`PrivacyTier`]. Tiers are totally
//! ordered by exposure risk, and the tier decides two things:
//! - whether the file is indexed at all (`max_indexed_tier`)
//! - whether its chunks may be handed to the external LLM client
//!   (`max_transmit_tier`, or the explicit `max_tier` passed to retrieval)

mod classifier;
mod secrets;

pub use classifier::PrivacyClassifier;
pub use secrets::{detect_secret, SecretKind};

use crate::error::{Result, TulioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Privacy tier, ordered from least to most sensitive
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyTier {
    Public,
    Internal,
    Sensitive,
    Restricted,
}

impl PrivacyTier {
    /// All tiers in ascending order of sensitivity
    pub const ALL: [PrivacyTier; 4] = [
        PrivacyTier::Public,
        PrivacyTier::Internal,
        PrivacyTier::Sensitive,
        PrivacyTier::Restricted,
    ];

    /// The tier unmatched content falls back to
    pub const MOST_RESTRICTIVE: PrivacyTier = PrivacyTier::Restricted;

    /// Integer rank used for storage and SQL comparisons
    pub fn rank(self) -> i64 {
        match self {
            Self::Public => 0,
            Self::Internal => 1,
            Self::Sensitive => 2,
            Self::Restricted => 3,
        }
    }

    /// Inverse of [`rank`](Self::rank)
    pub fn from_rank(rank: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.rank() == rank)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Sensitive => "sensitive",
            Self::Restricted => "restricted",
        }
    }

    /// Whether content at this tier may leave the machine under `max_tier`
    pub fn permits(self, max_tier: PrivacyTier) -> bool {
        self <= max_tier
    }
}

impl fmt::Display for PrivacyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyTier {
    type Err = TulioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            "sensitive" => Ok(Self::Sensitive),
            "restricted" => Ok(Self::Restricted),
            other => Err(TulioError::InvalidInput(format!(
                "Unknown privacy tier: {other} (expected public, internal, sensitive or restricted)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_totally_ordered() {
        assert!(PrivacyTier::Public < PrivacyTier::Internal);
        assert!(PrivacyTier::Internal < PrivacyTier::Sensitive);
        assert!(PrivacyTier::Sensitive < PrivacyTier::Restricted);
        assert_eq!(PrivacyTier::MOST_RESTRICTIVE, *PrivacyTier::ALL.iter().max().unwrap());
    }

    #[test]
    fn test_rank_roundtrip() {
        for tier in PrivacyTier::ALL {
            assert_eq!(PrivacyTier::from_rank(tier.rank()), Some(tier));
        }
        assert_eq!(PrivacyTier::from_rank(9), None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Sensitive".parse::<PrivacyTier>().unwrap(), PrivacyTier::Sensitive);
        assert_eq!(" public ".parse::<PrivacyTier>().unwrap(), PrivacyTier::Public);
        assert!("secret".parse::<PrivacyTier>().is_err());
    }

    #[test]
    fn test_permits() {
        assert!(PrivacyTier::Public.permits(PrivacyTier::Internal));
        assert!(PrivacyTier::Internal.permits(PrivacyTier::Internal));
        assert!(!PrivacyTier::Restricted.permits(PrivacyTier::Sensitive));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&PrivacyTier::Restricted).unwrap();
        assert_eq!(json, "\"restricted\"");
        let tier: PrivacyTier = serde_yaml::from_str("internal").unwrap();
        assert_eq!(tier, PrivacyTier::Internal);
    }
}
