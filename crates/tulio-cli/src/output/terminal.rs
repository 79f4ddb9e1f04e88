//! Terminal output formatter

use chrono::{DateTime, Local};
use tulio_core::{CleanupReport, IndexStats, IndexingReport, RecordSummary, ScoredChunk};

const PREVIEW_LINES: usize = 3;

pub fn format_results(results: &[ScoredChunk]) -> String {
    if results.is_empty() {
        return "No results\n".to_string();
    }

    let mut output = String::new();
    for result in results {
        let score_pct = (result.score * 100.0) as u32;
        output.push_str(&format!(
            "{:>3}% {} #{} [{}]\n",
            score_pct, result.chunk.path, result.chunk.seq, result.chunk.tier
        ));

        let mut lines = result.chunk.text.lines();
        for line in lines.by_ref().take(PREVIEW_LINES) {
            output.push_str(&format!("  {}\n", line));
        }
        if lines.next().is_some() {
            output.push_str("  ...\n");
        }
    }
    output
}

pub fn format_report(report: &IndexingReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("Scanned:         {}\n", report.files_scanned));
    output.push_str(&format!("Changed:         {}\n", report.files_changed));
    output.push_str(&format!("Unchanged:       {}\n", report.files_unchanged));
    output.push_str(&format!("Excluded:        {}\n", report.files_excluded));
    output.push_str(&format!("Missing:         {}\n", report.files_missing));
    if !report.errors.is_empty() {
        output.push_str(&format!("Errors:          {}\n", report.errors.len()));
        for error in &report.errors {
            output.push_str(&format!("  {}: {}\n", error.path, error.message));
        }
    }
    if report.cancelled {
        output.push_str("Run was cancelled; missing files were not checked\n");
    }
    output
}

pub fn format_cleanup(report: &CleanupReport) -> String {
    let mut output = format!("Removed {} records\n", report.removed_count);
    for path in &report.removed_paths {
        output.push_str(&format!("  {}\n", path));
    }
    output
}

pub fn format_stats(stats: &IndexStats) -> String {
    let mut output = String::new();
    output.push_str(&format!("Files:           {}\n", stats.total_files));
    output.push_str(&format!("Chunks:          {}\n", stats.total_chunks));
    output.push_str(&format!("Excluded:        {}\n", stats.excluded_files));
    output.push('\n');
    output.push_str("Tiers:\n");
    for (tier, count) in &stats.per_tier {
        output.push_str(&format!("  {:<15}{}\n", format!("{}:", tier), count));
    }
    output.push('\n');
    output.push_str(&format!(
        "Last indexed:    {}\n",
        stats
            .last_indexed
            .as_deref()
            .map(local_time)
            .unwrap_or_else(|| "never".to_string())
    ));
    output
}

pub fn format_records(records: &[RecordSummary]) -> String {
    if records.is_empty() {
        return "Index is empty\n".to_string();
    }

    let mut output = String::new();
    for summary in records {
        let record = &summary.record;
        let state = match (record.excluded, record.exclusion_reason.as_deref()) {
            (true, Some(reason)) => format!("excluded: {}", reason),
            (true, None) => "excluded".to_string(),
            (false, _) => format!("{} chunks", summary.chunk_count),
        };
        output.push_str(&format!(
            "{:<10} {:>8}  {}  {} ({})\n",
            record.tier.as_str(),
            record.fingerprint.size,
            &record.fingerprint.hash[..record.fingerprint.hash.len().min(12)],
            record.path,
            state
        ));
    }
    output
}

fn local_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
