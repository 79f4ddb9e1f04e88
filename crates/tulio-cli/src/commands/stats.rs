//! Stats command

use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use tulio_core::Engine;

pub async fn run(engine: &Engine, format: OutputFormat) -> Result<()> {
    let stats = engine.stats()?;
    print!("{}", output::format_stats(&stats, format)?);
    Ok(())
}
