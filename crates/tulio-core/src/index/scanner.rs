//! File scanning for indexing

use super::cancel::CancellationToken;
use super::fingerprint::{mtime_ns, Fingerprint};
use crate::config::IndexingConfig;
use crate::error::{Result, TulioError};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A regular file that passed every filter
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    /// Store key: the path as produced by the walk
    pub key: String,
    pub fingerprint: Fingerprint,
    /// Bytes that were hashed, when the file had to be read
    pub content: Option<Vec<u8>>,
}

/// Compiled scan filters
#[derive(Debug, Clone)]
pub struct ScanOptions {
    roots: Vec<PathBuf>,
    exclude_dirs: Vec<Pattern>,
    exclude_globs: Vec<Pattern>,
    file_types: Vec<String>,
    max_file_bytes: u64,
    exclude_hidden: bool,
    follow_symlinks: bool,
}

impl ScanOptions {
    pub fn from_config(config: &IndexingConfig) -> Result<Self> {
        let exclude_dirs = config
            .exclude_dirs
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let exclude_globs = config
            .exclude_globs
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let file_types = config
            .file_types
            .iter()
            .map(|t| {
                let t = t.trim().to_lowercase();
                if t.starts_with('.') {
                    t
                } else {
                    format!(".{t}")
                }
            })
            .collect();

        Ok(Self {
            roots: config.roots(),
            exclude_dirs,
            exclude_globs,
            file_types,
            max_file_bytes: config.max_file_bytes,
            exclude_hidden: config.exclude_hidden,
            follow_symlinks: config.follow_symlinks,
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether the current rules would still pick up `path`
    ///
    /// Checks root membership, per-component exclusions, full-path globs and
    /// the type allowlist. Size is not checked.
    pub fn is_eligible_path(&self, path: &Path) -> bool {
        let Some(root) = self.roots.iter().find(|root| path.starts_with(root)) else {
            return false;
        };
        let relative = path.strip_prefix(root).unwrap_or(path);
        let component_excluded = relative
            .components()
            .any(|c| self.skips_name(&c.as_os_str().to_string_lossy()));

        !component_excluded && !self.glob_excluded(path) && self.type_allowed(path)
    }

    /// Build a plan; `known` returns the recorded fingerprint for a store key
    pub fn plan<'a>(
        &'a self,
        known: impl Fn(&str) -> Option<Fingerprint> + 'a,
    ) -> ScanPlan<'a> {
        ScanPlan {
            options: self,
            known: Box::new(known),
            rehash_all: false,
        }
    }

    fn skips_name(&self, name: &str) -> bool {
        (self.exclude_hidden && name.starts_with('.'))
            || self.exclude_dirs.iter().any(|p| p.matches(name))
    }

    fn glob_excluded(&self, path: &Path) -> bool {
        self.exclude_globs.iter().any(|p| p.matches_path(path))
    }

    fn type_allowed(&self, path: &Path) -> bool {
        if self.file_types.is_empty() {
            return true;
        }
        match path.extension() {
            Some(ext) => {
                let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
                self.file_types.contains(&ext)
            }
            None => false,
        }
    }

    fn skips_entry(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && (self.skips_name(&entry.file_name().to_string_lossy())
                || self.glob_excluded(entry.path()))
    }
}

/// A restartable description of one scan
///
/// Every call to [`iter`](ScanPlan::iter) walks the roots from scratch.
pub struct ScanPlan<'a> {
    options: &'a ScanOptions,
    known: Box<dyn Fn(&str) -> Option<Fingerprint> + 'a>,
    rehash_all: bool,
}

impl<'a> ScanPlan<'a> {
    /// Read and hash every file, ignoring recorded fingerprints
    pub fn rehash_all(mut self, rehash: bool) -> Self {
        self.rehash_all = rehash;
        self
    }

    pub fn iter<'p>(&'p self, cancel: &CancellationToken) -> Scan<'p, 'a> {
        Scan {
            plan: self,
            roots: self.options.roots.iter(),
            walker: None,
            cancel: cancel.clone(),
            cancelled: false,
        }
    }

    fn fingerprint(&self, entry: &DirEntry) -> Result<Option<ScannedFile>> {
        let path = entry.path();
        let key = path.to_string_lossy().to_string();
        let metadata = entry.metadata().map_err(|e| scan_error(path, e))?;
        let size = metadata.len();
        let max = self.options.max_file_bytes;

        if size > max {
            tracing::debug!("Skipping {} ({} bytes, limit {})", key, size, max);
            return Ok(None);
        }

        let mtime = mtime_ns(&metadata);
        if !self.rehash_all {
            if let Some(recorded) = (self.known)(&key) {
                if recorded.matches_metadata(size, mtime) {
                    return Ok(Some(ScannedFile {
                        path: path.to_path_buf(),
                        key,
                        fingerprint: recorded,
                        content: None,
                    }));
                }
            }
        }

        let content = std::fs::read(path).map_err(|e| scan_error(path, e))?;
        if content.len() as u64 > max {
            tracing::debug!("Skipping {} (grew past limit while reading)", key);
            return Ok(None);
        }

        Ok(Some(ScannedFile {
            path: path.to_path_buf(),
            key,
            fingerprint: Fingerprint::from_content(&content, mtime),
            content: Some(content),
        }))
    }
}

/// Lazy walk over every root of a [`ScanPlan`]
pub struct Scan<'p, 'a> {
    plan: &'p ScanPlan<'a>,
    roots: std::slice::Iter<'p, PathBuf>,
    walker: Option<walkdir::IntoIter>,
    cancel: CancellationToken,
    cancelled: bool,
}

impl Scan<'_, '_> {
    /// Whether the walk stopped early because of cancellation
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Iterator for Scan<'_, '_> {
    type Item = Result<ScannedFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cancel.is_cancelled() {
                if !self.cancelled {
                    tracing::debug!("Scan cancelled");
                    self.cancelled = true;
                }
                return None;
            }

            if self.walker.is_none() {
                let root = self.roots.next()?;
                self.walker = Some(
                    WalkDir::new(root)
                        .follow_links(self.plan.options.follow_symlinks)
                        .sort_by_file_name()
                        .into_iter(),
                );
            }
            let Some(walker) = self.walker.as_mut() else {
                continue;
            };

            let entry = match walker.next() {
                None => {
                    self.walker = None;
                    continue;
                }
                Some(Err(e)) => return Some(Err(walk_error(e))),
                Some(Ok(entry)) => entry,
            };

            if self.plan.options.skips_entry(&entry) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() || !self.plan.options.type_allowed(entry.path()) {
                continue;
            }

            match self.plan.fingerprint(&entry) {
                Ok(Some(file)) => return Some(Ok(file)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn scan_error(path: &Path, err: impl std::fmt::Display) -> TulioError {
    TulioError::Scan {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn walk_error(err: walkdir::Error) -> TulioError {
    let path = err
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    TulioError::Scan {
        path,
        message: err.to_string(),
    }
}
