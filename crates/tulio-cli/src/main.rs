//! Tulio CLI
//!
//! Privacy-aware local indexing and retrieval from the command line.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tulio_core::error::exit_codes;
use tulio_core::{Config, Engine, TulioError};

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let code = e
            .downcast_ref::<TulioError>()
            .map(TulioError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }
    let engine = Arc::new(Engine::open(config)?);

    match cli.command {
        Commands::Index(args) => commands::index::run(args, engine, cli.format).await,
        Commands::Cleanup => commands::cleanup::run(&engine, cli.format).await,
        Commands::Stats => commands::stats::run(&engine, cli.format).await,
        Commands::Db => commands::db::run(&engine, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &engine, cli.format).await,
        Commands::Context(args) => commands::context::run(args, &engine, cli.format).await,
    }
}
