use crate::config::ClientConfig;
use crate::output::format_document;
use crate::search_cmd::connect;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use ragpilot_retrieval::DocId;
use std::io::{self, Write};

#[derive(Debug, Parser)]
pub struct DocsCli {
    #[command(subcommand)]
    pub command: DocsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DocsCommand {
    /// List ingested documents
    List,

    /// Delete one document and its chunks
    Delete(DeleteArgs),

    /// Delete every document
    DeleteAll(DeleteAllArgs),
}

#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Document id
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Debug, Parser)]
pub struct DeleteAllArgs {
    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl DocsCli {
    pub async fn run(self, config: &ClientConfig) -> Result<()> {
        match self.command {
            DocsCommand::List => run_list(config).await,
            DocsCommand::Delete(args) => run_delete(config, args).await,
            DocsCommand::DeleteAll(args) => run_delete_all(config, args).await,
        }
    }
}

async fn run_list(config: &ClientConfig) -> Result<()> {
    let entries = connect(config)?
        .list_documents()
        .await
        .context("Failed to list documents")?;
    if entries.is_empty() {
        println!("{} No documents ingested yet", "✗".bright_red());
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_document(entry));
    }
    println!("\n{} document(s)", entries.len());
    Ok(())
}

async fn run_delete(config: &ClientConfig, args: DeleteArgs) -> Result<()> {
    let id = DocId::new(args.id.trim());
    if !args.yes && !confirm(&format!("Delete document {id}?"))? {
        println!("Cancelled.");
        return Ok(());
    }
    connect(config)?
        .delete_document(&id)
        .await
        .with_context(|| format!("Failed to delete document {id}"))?;
    println!("{} Deleted document {id}", "✓".bright_green());
    Ok(())
}

async fn run_delete_all(config: &ClientConfig, args: DeleteAllArgs) -> Result<()> {
    if !args.yes && !confirm("Delete ALL documents?")? {
        println!("Cancelled.");
        return Ok(());
    }
    connect(config)?
        .delete_all_documents()
        .await
        .context("Failed to delete documents")?;
    println!("{} All documents deleted", "✓".bright_green());
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
