//! Index command

use crate::app::{IndexArgs, OutputFormat};
use crate::output;
use crate::progress::ProgressReporter;
use anyhow::Result;
use std::sync::Arc;
use tulio_core::Engine;

pub async fn run(args: IndexArgs, engine: Arc<Engine>, format: OutputFormat) -> Result<()> {
    let progress = ProgressReporter::new(format == OutputFormat::Json);
    let roots = engine.config().indexing.watch_dirs.join(", ");
    progress.set_message(&format!("Indexing {}", roots));

    let mut worker = {
        let engine = engine.clone();
        let force = args.force;
        tokio::task::spawn_blocking(move || engine.reindex(force))
    };

    let report = tokio::select! {
        joined = &mut worker => joined??,
        _ = tokio::signal::ctrl_c() => {
            progress.set_message("Cancelling...");
            engine.cancel()?;
            worker.await??
        }
    };

    progress.finish(if report.cancelled { "Cancelled" } else { "Done" });
    for error in &report.errors {
        tracing::warn!("{}: {}", error.path, error.message);
    }

    print!("{}", output::format_report(&report, format)?);
    Ok(())
}
