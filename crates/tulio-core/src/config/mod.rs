//! Configuration management
//!
//! The engine consumes a resolved [`Config`]. Files are YAML with the
//! sections `indexing`, `privacy`, `rag` and `database`; every field has a
//! default so a partial file is fine.

use crate::error::{Result, TulioError};
use crate::privacy::PrivacyTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub privacy: PrivacyConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// What to walk and what to skip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Root directories to index (`~` is expanded)
    #[serde(default = "default_watch_dirs")]
    pub watch_dirs: Vec<String>,

    /// Glob patterns matched against each path component
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Glob patterns matched against the full path
    #[serde(default)]
    pub exclude_globs: Vec<String>,

    /// Extension allowlist (with leading dot). Empty allows every extension.
    #[serde(default = "default_file_types")]
    pub file_types: Vec<String>,

    /// Files above this size are never read
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    #[serde(default = "default_true")]
    pub exclude_hidden: bool,

    #[serde(default)]
    pub follow_symlinks: bool,

    /// Age after which a query-time freshness check triggers a reindex
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            watch_dirs: default_watch_dirs(),
            exclude_dirs: default_exclude_dirs(),
            exclude_globs: Vec::new(),
            file_types: default_file_types(),
            max_file_bytes: default_max_file_bytes(),
            exclude_hidden: true,
            follow_symlinks: false,
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl IndexingConfig {
    /// Watch directories with `~` expanded
    pub fn roots(&self) -> Vec<PathBuf> {
        self.watch_dirs.iter().map(|d| expand_home(d)).collect()
    }
}

/// Privacy policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyConfig {
    /// Files classified above this tier are recorded but never chunked
    #[serde(default = "default_max_indexed_tier")]
    pub max_indexed_tier: PrivacyTier,

    /// Highest tier that may be sent to the external LLM client
    #[serde(default = "default_max_transmit_tier")]
    pub max_transmit_tier: PrivacyTier,

    /// Escalate files containing secret-like patterns to `restricted`
    #[serde(default = "default_true")]
    pub detect_secrets: bool,

    #[serde(default)]
    pub rules: PrivacyRules,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            max_indexed_tier: default_max_indexed_tier(),
            max_transmit_tier: default_max_transmit_tier(),
            detect_secrets: true,
            rules: PrivacyRules::default(),
        }
    }
}

/// Classification rules. The most restrictive match wins.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PrivacyRules {
    /// Directory prefix → tier
    #[serde(default)]
    pub prefixes: BTreeMap<String, PrivacyTier>,

    /// Glob over the full path → tier
    #[serde(default)]
    pub paths: BTreeMap<String, PrivacyTier>,

    /// Exact path → tier
    #[serde(default)]
    pub overrides: BTreeMap<String, PrivacyTier>,

    /// Extension (".md") → tier
    #[serde(default)]
    pub extensions: BTreeMap<String, PrivacyTier>,

    /// Regex over the content sample → tier
    #[serde(default)]
    pub content: Vec<ContentRule>,
}

/// Content heuristic rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRule {
    pub pattern: String,
    pub tier: PrivacyTier,
}

/// Chunking and retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Maximum chunk size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between fixed-size windows in bytes
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Default number of chunks returned per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Chunks scoring at or below this are never returned
    #[serde(default)]
    pub min_score: f32,

    #[serde(default)]
    pub scorer: ScorerKind,

    /// Dimensions of the hashed embeddings used by the vector scorer
    #[serde(default = "default_embedding_dims")]
    pub embedding_dims: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_results: default_max_results(),
            min_score: 0.0,
            scorer: ScorerKind::default(),
            embedding_dims: default_embedding_dims(),
        }
    }
}

/// Relevance scoring strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Lexical,
    Vector,
}

/// Database location
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_watch_dirs() -> Vec<String> {
    vec!["~/Documents".to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        ".cache",
        "node_modules",
        "__pycache__",
        ".venv",
        "venv",
        "target",
        "dist",
        "build",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_file_types() -> Vec<String> {
    [".txt", ".md", ".py", ".js", ".yaml", ".yml", ".json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_file_bytes() -> u64 {
    1024 * 1024
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_max_indexed_tier() -> PrivacyTier {
    PrivacyTier::Restricted
}

fn default_max_transmit_tier() -> PrivacyTier {
    PrivacyTier::Internal
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_max_results() -> usize {
    5
}

fn default_embedding_dims() -> usize {
    256
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Config rooted at a single directory, everything else default
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let mut config = Self::default();
        config.indexing.watch_dirs = vec![root.as_ref().to_string_lossy().to_string()];
        config
    }

    /// Load config from `TULIO_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var("TULIO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Load and validate config from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Database path from config, or the default cache location
    pub fn database_path(&self) -> PathBuf {
        match &self.database.path {
            Some(path) => expand_home(&path.to_string_lossy()),
            None => dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::CACHE_DIR_NAME)
                .join("index.sqlite"),
        }
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.indexing.watch_dirs.is_empty() {
            return Err(TulioError::Config("indexing.watch_dirs is empty".into()));
        }
        if self.rag.chunk_size == 0 {
            return Err(TulioError::Config("rag.chunk_size must be positive".into()));
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(TulioError::Config(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        if self.rag.scorer == ScorerKind::Vector && self.rag.embedding_dims == 0 {
            return Err(TulioError::Config(
                "rag.embedding_dims must be positive for the vector scorer".into(),
            ));
        }

        for pattern in self
            .indexing
            .exclude_dirs
            .iter()
            .chain(self.indexing.exclude_globs.iter())
            .chain(self.privacy.rules.paths.keys())
        {
            glob::Pattern::new(pattern)?;
        }
        for rule in &self.privacy.rules.content {
            regex::Regex::new(&rule.pattern)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.rag.chunk_size, 1000);
        assert_eq!(config.rag.chunk_overlap, 200);
        assert_eq!(config.privacy.max_transmit_tier, PrivacyTier::Internal);
        assert_eq!(config.privacy.max_indexed_tier, PrivacyTier::Restricted);
        assert!(config.indexing.file_types.contains(&".md".to_string()));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
indexing:
  watch_dirs: ["/srv/notes"]
privacy:
  max_transmit_tier: sensitive
  rules:
    prefixes:
      /srv/notes/finance: restricted
    extensions:
      .md: public
    content:
      - pattern: "(?i)confidential"
        tier: sensitive
rag:
  scorer: vector
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.indexing.watch_dirs, vec!["/srv/notes".to_string()]);
        assert_eq!(config.indexing.max_file_bytes, 1024 * 1024);
        assert_eq!(config.privacy.max_transmit_tier, PrivacyTier::Sensitive);
        assert_eq!(
            config.privacy.rules.prefixes.get("/srv/notes/finance"),
            Some(&PrivacyTier::Restricted)
        );
        assert_eq!(config.privacy.rules.content.len(), 1);
        assert_eq!(config.rag.scorer, ScorerKind::Vector);
        assert_eq!(config.rag.chunk_size, 1000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.rag.chunk_overlap = config.rag.chunk_size;
        assert!(matches!(config.validate(), Err(TulioError::Config(_))));

        let mut config = Config::default();
        config.indexing.watch_dirs.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.privacy.rules.content.push(ContentRule {
            pattern: "(unclosed".into(),
            tier: PrivacyTier::Sensitive,
        });
        assert!(matches!(config.validate(), Err(TulioError::Regex(_))));

        let mut config = Config::default();
        config.indexing.exclude_globs.push("[".into());
        assert!(matches!(config.validate(), Err(TulioError::GlobPattern(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        let mut config = Config::for_root("/data/docs");
        config.privacy.rules.extensions.insert(".txt".into(), PrivacyTier::Public);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.indexing.watch_dirs, vec!["/data/docs".to_string()]);
        assert_eq!(
            loaded.privacy.rules.extensions.get(".txt"),
            Some(&PrivacyTier::Public)
        );
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/notes"), home.join("notes"));
        }
    }
}
