//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tulio_core::PrivacyTier;

#[derive(Parser)]
#[command(name = "tulio")]
#[command(
    author,
    version,
    about = "Privacy-aware local index over your documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to TULIO_CONFIG or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Index database location
    #[arg(long, global = true, env = "TULIO_DB")]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan watched directories and update the index
    Index(IndexArgs),

    /// Remove records for excluded or vanished files
    Cleanup,

    /// Show index statistics
    Stats,

    /// Dump every file record
    Db,

    /// Retrieve the most relevant chunks for a query
    Search(SearchArgs),

    /// Print the context block that would be sent to the LLM
    Context(ContextArgs),
}

#[derive(Args)]
pub struct IndexArgs {
    /// Rehash and reclassify every file, ignoring stored fingerprints
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results (defaults to rag.max_results)
    #[arg(short = 'n')]
    pub limit: Option<usize>,

    /// Most sensitive tier allowed in the results
    #[arg(long, default_value = "internal")]
    pub max_tier: PrivacyTier,
}

#[derive(Args)]
pub struct ContextArgs {
    /// Query the context is built for
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of chunks (defaults to rag.max_results)
    #[arg(short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_args() {
        let cli = Cli::parse_from([
            "tulio", "search", "garden", "budget", "-n", "3", "--max-tier", "sensitive",
        ]);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, vec!["garden", "budget"]);
                assert_eq!(args.limit, Some(3));
                assert_eq!(args.max_tier, PrivacyTier::Sensitive);
            }
            _ => panic!("expected search"),
        }
        assert_eq!(cli.format, OutputFormat::Cli);
    }

    #[test]
    fn test_rejects_unknown_tier() {
        assert!(Cli::try_parse_from(["tulio", "search", "q", "--max-tier", "secret"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tulio", "index", "--force", "--format", "json", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Index(IndexArgs { force: true })));
    }
}
