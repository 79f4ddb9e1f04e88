//! Context command

use super::{query_text, refresh};
use crate::app::{ContextArgs, OutputFormat};
use anyhow::Result;
use tulio_core::Engine;

pub async fn run(args: ContextArgs, engine: &Engine, format: OutputFormat) -> Result<()> {
    refresh(engine)?;
    let query = query_text(&args.query);
    let limit = args.limit.unwrap_or(engine.config().rag.max_results);
    let context = engine.context_for_query(&query, limit)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "query": query,
                "max_tier": engine.config().privacy.max_transmit_tier,
                "context": context,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            if context.is_empty() {
                eprintln!("No transmittable context for this query");
            } else {
                println!("{}", context);
            }
        }
    }
    Ok(())
}
