use crate::error::{Result, RetrievalError};
use crate::mode::{RetrievalMode, StageMode};
use crate::weights::WeightPair;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_TOP_K: u32 = 5;
pub const DEFAULT_STAGE_K: u32 = 60;

pub const SEARCH_CHUNKS: &str = "rpc/search_chunks";
pub const SEARCH_CHUNKS_HYBRID: &str = "rpc/search_chunks_hybrid";
pub const SEARCH_CHUNKS_RERANK: &str = "rpc/search_chunks_rerank";

/// Number of results to request; missing or non-positive values fall back to 5.
pub fn resolve_top_k(raw: Option<i64>) -> u32 {
    resolve_positive(raw, DEFAULT_TOP_K)
}

/// Size of the staging pool for rerank modes; defaults to 60.
pub fn resolve_stage_k(raw: Option<i64>) -> u32 {
    resolve_positive(raw, DEFAULT_STAGE_K)
}

fn resolve_positive(raw: Option<i64>, default: u32) -> u32 {
    raw.filter(|value| *value > 0)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(default)
}

/// Trimmed model name; blank names leave the choice to the backend.
pub fn normalize_rerank_model(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Parameters of the staging search that feeds a rerank pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StageParams {
    pub stage_k: u32,
    pub rerank_model: Option<String>,
}

impl StageParams {
    pub fn new(stage_k: Option<i64>, rerank_model: Option<&str>) -> Self {
        Self {
            stage_k: resolve_stage_k(stage_k),
            rerank_model: normalize_rerank_model(rerank_model),
        }
    }
}

impl Default for StageParams {
    fn default() -> Self {
        Self {
            stage_k: DEFAULT_STAGE_K,
            rerank_model: None,
        }
    }
}

/// One search call, shaped by retrieval mode.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalRequest {
    Semantic {
        query: String,
        top_k: u32,
    },
    Hybrid {
        query: String,
        top_k: u32,
        weights: WeightPair,
    },
    Rerank {
        query: String,
        top_k: u32,
        weights: WeightPair,
        stage_mode: StageMode,
        stage: StageParams,
    },
}

/// Endpoint path (relative to the API root) and JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    pub endpoint: &'static str,
    pub payload: Value,
}

#[derive(Serialize)]
struct SemanticPayload<'a> {
    p_query: &'a str,
    k: u32,
}

#[derive(Serialize)]
struct HybridPayload<'a> {
    p_query: &'a str,
    k: u32,
    p_w_lex: f64,
    p_w_sem: f64,
}

/// `p_rerank_model` is always sent; `null` selects the backend default.
#[derive(Serialize)]
struct RerankPayload<'a> {
    p_query: &'a str,
    k: u32,
    p_stage_k: u32,
    p_stage_mode: StageMode,
    p_w_lex: f64,
    p_w_sem: f64,
    p_rerank_model: Option<&'a str>,
}

impl RetrievalRequest {
    /// Build the request for `mode`. Semantic search drops `weights`; `stage`
    /// only matters for the rerank modes.
    pub fn new(
        mode: RetrievalMode,
        query: &str,
        top_k: u32,
        weights: WeightPair,
        stage: StageParams,
    ) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        let query = query.to_string();
        let top_k = top_k.max(1);
        let request = match mode {
            RetrievalMode::Semantic => RetrievalRequest::Semantic { query, top_k },
            RetrievalMode::Hybrid => RetrievalRequest::Hybrid {
                query,
                top_k,
                weights,
            },
            RetrievalMode::SemanticRerank => RetrievalRequest::Rerank {
                query,
                top_k,
                weights,
                stage_mode: StageMode::Semantic,
                stage,
            },
            RetrievalMode::HybridRerank => RetrievalRequest::Rerank {
                query,
                top_k,
                weights,
                stage_mode: StageMode::Hybrid,
                stage,
            },
        };
        Ok(request)
    }

    pub fn mode(&self) -> RetrievalMode {
        match self {
            RetrievalRequest::Semantic { .. } => RetrievalMode::Semantic,
            RetrievalRequest::Hybrid { .. } => RetrievalMode::Hybrid,
            RetrievalRequest::Rerank {
                stage_mode: StageMode::Semantic,
                ..
            } => RetrievalMode::SemanticRerank,
            RetrievalRequest::Rerank {
                stage_mode: StageMode::Hybrid,
                ..
            } => RetrievalMode::HybridRerank,
        }
    }

    pub fn query(&self) -> &str {
        match self {
            RetrievalRequest::Semantic { query, .. }
            | RetrievalRequest::Hybrid { query, .. }
            | RetrievalRequest::Rerank { query, .. } => query,
        }
    }

    /// Weights the backend will use, if the mode sends any.
    pub fn weights(&self) -> Option<WeightPair> {
        match self {
            RetrievalRequest::Semantic { .. } => None,
            RetrievalRequest::Hybrid { weights, .. }
            | RetrievalRequest::Rerank { weights, .. } => Some(*weights),
        }
    }

    /// Map this request onto its backend endpoint and payload.
    pub fn call(&self) -> RpcCall {
        let (endpoint, payload) = match self {
            RetrievalRequest::Semantic { query, top_k } => (
                SEARCH_CHUNKS,
                serde_json::json!(SemanticPayload {
                    p_query: query,
                    k: *top_k,
                }),
            ),
            RetrievalRequest::Hybrid {
                query,
                top_k,
                weights,
            } => (
                SEARCH_CHUNKS_HYBRID,
                serde_json::json!(HybridPayload {
                    p_query: query,
                    k: *top_k,
                    p_w_lex: weights.lexical,
                    p_w_sem: weights.semantic,
                }),
            ),
            RetrievalRequest::Rerank {
                query,
                top_k,
                weights,
                stage_mode,
                stage,
            } => (
                SEARCH_CHUNKS_RERANK,
                serde_json::json!(RerankPayload {
                    p_query: query,
                    k: *top_k,
                    p_stage_k: stage.stage_k,
                    p_stage_mode: *stage_mode,
                    p_w_lex: weights.lexical,
                    p_w_sem: weights.semantic,
                    p_rerank_model: stage.rerank_model.as_deref(),
                }),
            ),
        };
        debug!(endpoint, mode = %self.mode(), "built search call");
        RpcCall { endpoint, payload }
    }
}
