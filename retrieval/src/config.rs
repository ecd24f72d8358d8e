use crate::chat::DEFAULT_PIN_SEM;
use crate::mode::RetrievalMode;
use crate::request::{DEFAULT_STAGE_K, DEFAULT_TOP_K, StageParams};
use crate::weights::{DEFAULT_LEXICAL_WEIGHT, DEFAULT_SEMANTIC_WEIGHT, WeightPair};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub const DEFAULT_RERANK_MODEL: &str = "BAAI/bge-reranker-base";

/// Operator-facing retrieval options
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Retrieval mode used for previews and chat
    #[serde(default)]
    pub mode: RetrievalMode,

    /// Number of chunks to return
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Semantic hits pinned into the chat context
    #[serde(default = "default_pin_sem")]
    pub pin_sem: u32,

    /// Adjust hybrid weights per query
    #[serde(default = "default_true")]
    pub smart: bool,

    /// Base lexical weight (0.0 - 1.0)
    #[serde(default = "default_lexical_weight")]
    pub w_lex: f64,

    /// Base semantic weight (0.0 - 1.0)
    #[serde(default = "default_semantic_weight")]
    pub w_sem: f64,

    /// Staging pool size for rerank modes
    #[serde(default = "default_stage_k")]
    pub stage_k: u32,

    /// Cross-encoder used by rerank modes; blank lets the backend decide
    #[serde(default = "default_rerank_model")]
    pub rerank_model: Option<String>,

    /// Maximum staging distance shown in previews
    #[serde(default)]
    pub threshold: Option<f64>,
}

fn default_top_k() -> u32 {
    DEFAULT_TOP_K
}

fn default_pin_sem() -> u32 {
    DEFAULT_PIN_SEM
}

fn default_true() -> bool {
    true
}

fn default_lexical_weight() -> f64 {
    DEFAULT_LEXICAL_WEIGHT
}

fn default_semantic_weight() -> f64 {
    DEFAULT_SEMANTIC_WEIGHT
}

fn default_stage_k() -> u32 {
    DEFAULT_STAGE_K
}

fn default_rerank_model() -> Option<String> {
    Some(DEFAULT_RERANK_MODEL.to_string())
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::default(),
            top_k: default_top_k(),
            pin_sem: default_pin_sem(),
            smart: true,
            w_lex: default_lexical_weight(),
            w_sem: default_semantic_weight(),
            stage_k: default_stage_k(),
            rerank_model: default_rerank_model(),
            threshold: None,
        }
    }
}

impl RetrievalSettings {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.w_lex) {
            return Err(format!("w_lex must be in [0.0, 1.0], got {}", self.w_lex));
        }

        if !(0.0..=1.0).contains(&self.w_sem) {
            return Err(format!("w_sem must be in [0.0, 1.0], got {}", self.w_sem));
        }

        if self.top_k == 0 {
            return Err("top_k must be > 0".to_string());
        }

        if self.stage_k == 0 {
            return Err("stage_k must be > 0".to_string());
        }

        if self.mode.is_rerank() && self.stage_k < self.top_k {
            return Err(format!(
                "stage_k ({}) should not be smaller than top_k ({}) in rerank modes",
                self.stage_k, self.top_k
            ));
        }

        if let Some(threshold) = self.threshold
            && !threshold.is_finite()
        {
            return Err(format!("threshold must be a finite number, got {threshold}"));
        }

        Ok(())
    }

    pub fn base_weights(&self) -> WeightPair {
        WeightPair::new(self.w_lex, self.w_sem)
    }

    pub fn stage_params(&self) -> StageParams {
        StageParams::new(Some(i64::from(self.stage_k)), self.rerank_model.as_deref())
    }
}
