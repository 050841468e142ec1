//! gatekeep CLI

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Merge-readiness decisions for reviewed GitHub pull requests
#[derive(Parser)]
#[command(name = "gatekeep", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether a pull request is ready to merge
    Query {
        /// Pull request number
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// List open pull requests carrying the target label
    List {
        /// Continue after this cursor
        #[arg(long)]
        after: Option<String>,

        /// Number of pull requests per page
        #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: u32,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gatekeep=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Query { number, json } => {
            cli::run_query(cli.config.as_deref(), number, json).await?;
        }
        Commands::List { after, limit } => {
            cli::run_list(cli.config.as_deref(), after.as_deref(), limit).await?;
        }
    }

    Ok(())
}
