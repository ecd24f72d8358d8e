//! `ragpilot`: operator console for a retrieval-augmented QA backend.
//!
//! ```bash
//! ragpilot preview "travel per diem" --mode hybrid
//! ragpilot ask "what is the meal limit?" --show-chunks
//! ragpilot docs list
//! ragpilot status --rerank-log 20
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use ragpilot_cli::config::ClientConfig;
use ragpilot_cli::docs_cmd::DocsCli;
use ragpilot_cli::search_cmd::{AskArgs, PreviewArgs, run_ask, run_preview};
use ragpilot_cli::status_cmd::{StatusArgs, run_ingest, run_status};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "ragpilot",
    version,
    about = "Operator console for a retrieval-augmented QA backend"
)]
struct Cli {
    /// Config file (default: $RAGPILOT_HOME/config.toml or ~/.ragpilot/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend API root, e.g. http://127.0.0.1:3000/api
    #[arg(long, global = true, value_name = "URL")]
    api_root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the ranked chunks a query retrieves
    Preview(PreviewArgs),

    /// Ask the assistant a question
    Ask(AskArgs),

    /// List or delete ingested documents
    Docs(DocsCli),

    /// Run one ingest pass over pending uploads
    Ingest,

    /// Show ingest, chunking and rerank status
    Status(StatusArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::load(cli.config.as_deref(), cli.api_root.as_deref())?;
    match cli.command {
        Command::Preview(args) => run_preview(&config, args).await,
        Command::Ask(args) => run_ask(&config, args).await,
        Command::Docs(docs) => docs.run(&config).await,
        Command::Ingest => run_ingest(&config).await,
        Command::Status(args) => run_status(&config, args).await,
    }
}
