//! Record dump command

use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use tulio_core::Engine;

pub async fn run(engine: &Engine, format: OutputFormat) -> Result<()> {
    let records = engine.dump()?;
    print!("{}", output::format_records(&records, format)?);
    Ok(())
}
