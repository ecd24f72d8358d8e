use anyhow::{Result, anyhow};
use clap::Args;
use ragpilot_retrieval::{RetrievalMode, RetrievalSettings};

/// Per-invocation overrides for the configured retrieval settings.
#[derive(Debug, Default, Clone, Args)]
pub struct RetrievalArgs {
    /// Retrieval mode: semantic, hybrid, semantic_rerank or hybrid_rerank
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<RetrievalMode>,

    /// Number of chunks to return
    #[arg(short = 'k', long, value_name = "N")]
    pub top_k: Option<u32>,

    /// Hide rows whose staging distance exceeds this value
    #[arg(long, value_name = "DIST")]
    pub threshold: Option<f64>,

    /// Base lexical weight (0.0 - 1.0)
    #[arg(long, value_name = "W")]
    pub lex: Option<f64>,

    /// Base semantic weight (0.0 - 1.0)
    #[arg(long, value_name = "W")]
    pub sem: Option<f64>,

    /// Send the base weights unchanged instead of adapting them to the query
    #[arg(long)]
    pub no_smart: bool,

    /// Staging pool size for rerank modes
    #[arg(long, value_name = "N")]
    pub stage_k: Option<u32>,

    /// Cross-encoder model for rerank modes (empty selects the backend default)
    #[arg(long, value_name = "MODEL")]
    pub rerank_model: Option<String>,
}

impl RetrievalArgs {
    /// Layer these flags over `base` and validate the result.
    pub fn settings(&self, base: &RetrievalSettings) -> Result<RetrievalSettings> {
        let mut settings = base.clone();
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(top_k) = self.top_k {
            settings.top_k = top_k;
        }
        if let Some(threshold) = self.threshold {
            settings.threshold = Some(threshold);
        }
        if let Some(lex) = self.lex {
            settings.w_lex = lex;
        }
        if let Some(sem) = self.sem {
            settings.w_sem = sem;
        }
        if self.no_smart {
            settings.smart = false;
        }
        if let Some(stage_k) = self.stage_k {
            settings.stage_k = stage_k;
        }
        if let Some(model) = &self.rerank_model {
            settings.rerank_model = Some(model.clone());
        }
        settings.validate().map_err(|msg| anyhow!(msg))?;
        Ok(settings)
    }
}
