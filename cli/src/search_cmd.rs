use crate::args::RetrievalArgs;
use crate::config::ClientConfig;
use crate::output::{document_listing_answer, format_rows, weights_note};
use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use ragpilot_backend_client::{BackendClient, PreviewSession};
use ragpilot_retrieval::{
    ChatRequest, RetrievalSettings, effective_weights, is_document_listing_intent,
};
use tracing::{debug, warn};

#[derive(Debug, Parser)]
pub struct PreviewArgs {
    /// Search query
    #[arg(value_name = "QUERY")]
    pub query: String,

    #[command(flatten)]
    pub retrieval: RetrievalArgs,
}

#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Question for the assistant
    #[arg(value_name = "QUESTION")]
    pub question: String,

    /// Print the retrieved chunks before the answer
    #[arg(long)]
    pub show_chunks: bool,

    /// Semantic hits always kept in the answer context
    #[arg(long, value_name = "N")]
    pub pin_sem: Option<u32>,

    #[command(flatten)]
    pub retrieval: RetrievalArgs,
}

pub async fn run_preview(config: &ClientConfig, args: PreviewArgs) -> Result<()> {
    let settings = args.retrieval.settings(&config.retrieval)?;
    let session = PreviewSession::new(connect(config)?);
    print_preview(&session, &args.query, &settings).await
}

pub async fn run_ask(config: &ClientConfig, args: AskArgs) -> Result<()> {
    let mut settings = args.retrieval.settings(&config.retrieval)?;
    if let Some(pin_sem) = args.pin_sem {
        settings.pin_sem = pin_sem;
    }
    let client = connect(config)?;

    if is_document_listing_intent(&args.question) {
        match client.list_documents().await {
            Ok(entries) => {
                println!("{}", document_listing_answer(&entries));
                return Ok(());
            }
            Err(err) => warn!(%err, "document listing failed; asking the assistant instead"),
        }
    }

    if args.show_chunks {
        let session = PreviewSession::new(client.clone());
        // Chunks are diagnostic; the question is still sent when they fail.
        if let Err(err) = print_preview(&session, &args.question, &settings).await {
            warn!(%err, "retrieval preview failed");
            println!("{} Error: {err:#}", "✗".bright_red());
        }
        println!();
    }

    let weights = effective_weights(
        settings.mode,
        settings.smart,
        &args.question,
        settings.base_weights(),
    );
    let request = ChatRequest::new(
        &args.question,
        settings.top_k,
        settings.mode,
        weights,
        Some(i64::from(settings.pin_sem)),
        settings.stage_params(),
    )?;
    let answer = client.chat(&request).await.context("Chat request failed")?;
    println!("{} {answer}", "Assistant:".bright_blue());
    Ok(())
}

async fn print_preview(
    session: &PreviewSession,
    query: &str,
    settings: &RetrievalSettings,
) -> Result<()> {
    let Some(preview) = session
        .preview(query, settings)
        .await
        .context("Search failed")?
    else {
        debug!("preview superseded");
        return Ok(());
    };
    println!(
        "{} {}",
        "▶".bright_blue(),
        weights_note(preview.mode, settings.smart, preview.weights).dimmed()
    );
    println!();
    println!("{}", format_rows(&preview.rows, preview.mode));
    Ok(())
}

pub(crate) fn connect(config: &ClientConfig) -> Result<BackendClient> {
    BackendClient::new(&config.api_root)
        .with_context(|| format!("Failed to create client for {}", config.api_root))
}
