//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use anyhow::Result;
use tulio_core::{CleanupReport, IndexStats, IndexingReport, RecordSummary, ScoredChunk};

/// Format retrieved chunks
pub fn format_results(results: &[ScoredChunk], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::to_json(&results),
        OutputFormat::Cli => Ok(terminal::format_results(results)),
    }
}

pub fn format_report(report: &IndexingReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::to_json(report),
        OutputFormat::Cli => Ok(terminal::format_report(report)),
    }
}

pub fn format_cleanup(report: &CleanupReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::to_json(report),
        OutputFormat::Cli => Ok(terminal::format_cleanup(report)),
    }
}

pub fn format_stats(stats: &IndexStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::to_json(stats),
        OutputFormat::Cli => Ok(terminal::format_stats(stats)),
    }
}

pub fn format_records(records: &[RecordSummary], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::to_json(&records),
        OutputFormat::Cli => Ok(terminal::format_records(records)),
    }
}
