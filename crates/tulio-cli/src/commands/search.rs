//! Search command

use super::{query_text, refresh};
use crate::app::{OutputFormat, SearchArgs};
use crate::output;
use anyhow::Result;
use tulio_core::Engine;

pub async fn run(args: SearchArgs, engine: &Engine, format: OutputFormat) -> Result<()> {
    refresh(engine)?;
    let query = query_text(&args.query);
    let limit = args.limit.unwrap_or(engine.config().rag.max_results);
    let results = engine.retrieve(&query, args.max_tier, limit)?;

    print!("{}", output::format_results(&results, format)?);
    Ok(())
}
