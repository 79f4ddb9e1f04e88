//! CLI command handlers

pub mod cleanup;
pub mod context;
pub mod db;
pub mod index;
pub mod search;
pub mod stats;

use anyhow::Result;
use tulio_core::Engine;

/// Incremental reindex before a query when the index is older than
/// `indexing.refresh_interval_secs`
pub(crate) fn refresh(engine: &Engine) -> Result<()> {
    if let Some(report) = engine.ensure_fresh_default()? {
        tracing::info!(
            "Refreshed index: {} changed, {} excluded, {} missing",
            report.files_changed,
            report.files_excluded,
            report.files_missing
        );
        for error in &report.errors {
            tracing::warn!("{}: {}", error.path, error.message);
        }
    }
    Ok(())
}

/// Join a multi-word query argument
pub(crate) fn query_text(words: &[String]) -> String {
    words.join(" ")
}
