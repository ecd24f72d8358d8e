use crate::error::{Result, RetrievalError};
use crate::mode::{RetrievalMode, StageMode};
use crate::request::{RpcCall, StageParams};
use crate::weights::WeightPair;
use regex_lite::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

pub const CHAT_RAG_OPTS: &str = "rpc/chat_rag_opts";
pub const DEFAULT_PIN_SEM: u32 = 3;

#[allow(clippy::expect_used)]
static DOCUMENT_LISTING_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(list|show|which|what).*(document|documents|doc|docs|file|files)|\b(document|documents|doc|docs|file|files)\b.*(do you have|are stored|do you store)",
    )
    .expect("Valid regex")
});

/// Whether the operator is asking which documents are stored, which is
/// answered from the document listing instead of the generator.
pub fn is_document_listing_intent(question: &str) -> bool {
    DOCUMENT_LISTING_INTENT.is_match(question)
}

/// Question sent to the answer generator with the active retrieval options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    #[serde(rename = "p_query")]
    pub query: String,
    pub k: u32,
    #[serde(rename = "p_mode")]
    pub mode: RetrievalMode,
    #[serde(rename = "p_w_lex")]
    pub lexical_weight: f64,
    #[serde(rename = "p_w_sem")]
    pub semantic_weight: f64,
    /// Semantic hits always kept in the fused context.
    #[serde(rename = "p_pin_sem")]
    pub pin_sem: u32,
    #[serde(rename = "p_stage_k")]
    pub stage_k: u32,
    #[serde(rename = "p_use_rerank")]
    pub use_rerank: bool,
    #[serde(rename = "p_rerank_stage_mode")]
    pub rerank_stage_mode: Option<StageMode>,
    #[serde(rename = "p_rerank_model")]
    pub rerank_model: Option<String>,
}

impl ChatRequest {
    pub fn new(
        question: &str,
        top_k: u32,
        mode: RetrievalMode,
        weights: WeightPair,
        pin_sem: Option<i64>,
        stage: StageParams,
    ) -> Result<Self> {
        let query = question.trim();
        if query.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        Ok(Self {
            query: query.to_string(),
            k: top_k.max(1),
            mode,
            lexical_weight: weights.lexical,
            semantic_weight: weights.semantic,
            pin_sem: pin_sem
                .filter(|value| *value > 0)
                .and_then(|value| u32::try_from(value).ok())
                .unwrap_or(DEFAULT_PIN_SEM),
            stage_k: stage.stage_k,
            use_rerank: mode.is_rerank(),
            rerank_stage_mode: mode.stage_mode(),
            rerank_model: stage.rerank_model,
        })
    }

    pub fn call(&self) -> RpcCall {
        RpcCall {
            endpoint: CHAT_RAG_OPTS,
            payload: serde_json::json!(self),
        }
    }
}

/// Extract the answer text from a chat response body.
///
/// Scalar text RPCs come back as a JSON string; some deployments wrap it as
/// `[{"chat_rag": "..."}]`. Anything else is shown as compact JSON.
pub fn normalize_chat_answer(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Array(items) => match items.first().and_then(|first| first.get("chat_rag")) {
            Some(Value::String(text)) => text.clone(),
            _ => body.to_string(),
        },
        other => other.to_string(),
    }
}
