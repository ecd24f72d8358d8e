use crate::config::ClientConfig;
use crate::output::format_rerank_event;
use crate::search_cmd::connect;
use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use ragpilot_backend_client::{BackendClient, EmbeddingProgress};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Also show vectorizer queue and worker state
    #[arg(long)]
    pub vectorizer: bool,

    /// Show the most recent N rerank events
    #[arg(long, value_name = "N")]
    pub rerank_log: Option<usize>,
}

pub async fn run_ingest(config: &ClientConfig) -> Result<()> {
    connect(config)?
        .run_ingest_once()
        .await
        .context("Failed to trigger ingest")?;
    println!("{} Ingest triggered", "✓".bright_green());
    Ok(())
}

pub async fn run_status(config: &ClientConfig, args: StatusArgs) -> Result<()> {
    let client = connect(config)?;

    println!("{} Backend {}", "▶".bright_blue(), client.api_root());
    println!("  Chunking: {}", client.chunking_mode().await);

    let rows = client
        .ingest_status()
        .await
        .context("Failed to load ingest status")?;
    println!("  Embeddings: {}", EmbeddingProgress::from_rows(&rows));
    for row in &rows {
        println!("  {}", serde_json::to_string(row)?.dimmed());
    }

    if args.vectorizer {
        print_view("Vectorizer", client.vectorizer_status().await);
        print_view("Vectorizer worker", client.vectorizer_worker_progress().await);
    }

    if let Some(limit) = args.rerank_log {
        print_rerank_log(&client, limit).await?;
    }
    Ok(())
}

fn print_view(title: &str, view: ragpilot_backend_client::Result<Value>) {
    println!("\n{} {title}", "▶".bright_blue());
    match view {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{pretty}"),
            Err(err) => warn!(%err, "failed to render {title}"),
        },
        Err(err) => {
            warn!(%err, "{title} unavailable");
            println!("Unavailable");
        }
    }
}

async fn print_rerank_log(client: &BackendClient, limit: usize) -> Result<()> {
    let events = client
        .rerank_events(limit)
        .await
        .context("Failed to load rerank events")?;
    println!("\n{} Rerank log", "▶".bright_blue());
    if events.is_empty() {
        println!("(no rerank events yet)");
    }
    for event in &events {
        println!("{}", format_rerank_event(event));
    }
    Ok(())
}
