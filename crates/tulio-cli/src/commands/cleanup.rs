//! Cleanup command

use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use tulio_core::Engine;

pub async fn run(engine: &Engine, format: OutputFormat) -> Result<()> {
    let report = engine.cleanup()?;
    print!("{}", output::format_cleanup(&report, format)?);
    Ok(())
}
