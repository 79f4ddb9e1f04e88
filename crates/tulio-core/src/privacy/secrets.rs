//! Built-in secret detectors
//!
//! Any match escalates a file to the most restrictive tier.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PRIVATE_KEY_RE: Regex =
        Regex::new(r"-----BEGIN [A-Z ]*PRIVATE KEY-----").unwrap();
    static ref ASSIGNMENT_RE: Regex = Regex::new(
        r"(?i)(?:^|[^a-z0-9])(secret|passw(?:or)?d|api[_-]?key|access[_-]?key|(?:auth|access|bearer)[_-]?token)[\w-]*\s*[=:]\s*\S+"
    )
    .unwrap();
    static ref AWS_KEY_RE: Regex = Regex::new(r"\b(AKIA|ASIA)[0-9A-Z]{16}\b").unwrap();
}

/// What kind of secret was spotted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    PrivateKey,
    CredentialAssignment,
    CloudAccessKey,
}

/// Return the first secret-like pattern found in `text`, if any
pub fn detect_secret(text: &str) -> Option<SecretKind> {
    if PRIVATE_KEY_RE.is_match(text) {
        Some(SecretKind::PrivateKey)
    } else if AWS_KEY_RE.is_match(text) {
        Some(SecretKind::CloudAccessKey)
    } else if ASSIGNMENT_RE.is_match(text) {
        Some(SecretKind::CredentialAssignment)
    } else {
        None
    }
}
