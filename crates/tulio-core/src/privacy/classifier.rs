//! Rule-based privacy classification

use super::secrets::detect_secret;
use super::PrivacyTier;
use crate::config::{expand_home, PrivacyConfig};
use crate::error::Result;
use glob::Pattern;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Assigns a [`PrivacyTier`] to a path and an optional content sample.
///
/// Path rules (prefix, glob, exact override, extension) decide the base
/// tier; content rules can only escalate it. When several rules match, the
/// most restrictive one wins. A path matching no path rule is `Restricted`.
#[derive(Debug, Clone)]
pub struct PrivacyClassifier {
    prefixes: Vec<(PathBuf, PrivacyTier)>,
    globs: Vec<(Pattern, PrivacyTier)>,
    overrides: Vec<(PathBuf, PrivacyTier)>,
    extensions: Vec<(String, PrivacyTier)>,
    content: Vec<(Regex, PrivacyTier)>,
    detect_secrets: bool,
}

impl PrivacyClassifier {
    /// Compile the classifier from the privacy section of the config
    pub fn from_config(config: &PrivacyConfig) -> Result<Self> {
        let rules = &config.rules;

        let prefixes = rules
            .prefixes
            .iter()
            .map(|(prefix, tier)| (expand_home(prefix), *tier))
            .collect();

        let globs = rules
            .paths
            .iter()
            .map(|(pattern, tier)| Ok((Pattern::new(pattern)?, *tier)))
            .collect::<Result<Vec<_>>>()?;

        let overrides = rules
            .overrides
            .iter()
            .map(|(path, tier)| (expand_home(path), *tier))
            .collect();

        let extensions = rules
            .extensions
            .iter()
            .map(|(ext, tier)| (normalize_extension(ext), *tier))
            .collect();

        let content = rules
            .content
            .iter()
            .map(|rule| Ok((Regex::new(&rule.pattern)?, rule.tier)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            prefixes,
            globs,
            overrides,
            extensions,
            content,
            detect_secrets: config.detect_secrets,
        })
    }

    /// Classify a file. Never fails; unknown paths fail closed.
    pub fn classify(&self, path: &Path, content_sample: Option<&str>) -> PrivacyTier {
        let tier = match self.path_tier(path) {
            Some(tier) => tier,
            None => {
                tracing::debug!(
                    "No privacy rule matches {}, defaulting to {}",
                    path.display(),
                    PrivacyTier::MOST_RESTRICTIVE
                );
                return PrivacyTier::MOST_RESTRICTIVE;
            }
        };

        match content_sample.and_then(|sample| self.content_tier(sample)) {
            Some(escalated) if escalated > tier => {
                tracing::debug!("Content of {} escalates tier to {}", path.display(), escalated);
                escalated
            }
            _ => tier,
        }
    }

    /// Highest tier among matching path rules
    fn path_tier(&self, path: &Path) -> Option<PrivacyTier> {
        let path_str = path.to_string_lossy();

        let prefix_hits = self
            .prefixes
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix))
            .map(|(_, tier)| *tier);

        let glob_hits = self
            .globs
            .iter()
            .filter(|(pattern, _)| pattern.matches(&path_str))
            .map(|(_, tier)| *tier);

        let override_hits = self
            .overrides
            .iter()
            .filter(|(exact, _)| exact.as_path() == path)
            .map(|(_, tier)| *tier);

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()));
        let extension_hits = self
            .extensions
            .iter()
            .filter(|(ext, _)| extension.as_deref() == Some(ext.as_str()))
            .map(|(_, tier)| *tier);

        prefix_hits
            .chain(glob_hits)
            .chain(override_hits)
            .chain(extension_hits)
            .max()
    }

    /// Highest tier among matching content heuristics
    fn content_tier(&self, sample: &str) -> Option<PrivacyTier> {
        let secret = if self.detect_secrets {
            detect_secret(sample).map(|_| PrivacyTier::MOST_RESTRICTIVE)
        } else {
            None
        };

        self.content
            .iter()
            .filter(|(re, _)| re.is_match(sample))
            .map(|(_, tier)| *tier)
            .chain(secret)
            .max()
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
