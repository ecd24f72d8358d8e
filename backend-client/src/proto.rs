use chrono::{DateTime, Utc};
use ragpilot_retrieval::{DocId, deserialize_timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One row of `v_ingest_status`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestStatusRow {
    #[serde(default)]
    pub chunks_total: Option<u64>,
    #[serde(default)]
    pub chunks_pending: Option<u64>,
    /// Remaining columns, shown verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Embedding progress summed over every ingest status row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EmbeddingProgress {
    pub done: u64,
    pub total: u64,
    pub percent: u64,
}

impl EmbeddingProgress {
    pub fn from_rows(rows: &[IngestStatusRow]) -> Self {
        let total: u64 = rows.iter().filter_map(|row| row.chunks_total).sum();
        let pending: u64 = rows.iter().filter_map(|row| row.chunks_pending).sum();
        let done = total.saturating_sub(pending);
        let percent = if total > 0 {
            (done as f64 / total as f64 * 100.0).round() as u64
        } else {
            0
        };
        Self {
            done,
            total,
            percent,
        }
    }
}

impl fmt::Display for EmbeddingProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} ({}%)", self.done, self.total, self.percent)
    }
}

/// Chunking strategy reported by `rpc/chunking_mode`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingMode {
    #[default]
    Heuristic,
    Llm,
}

impl ChunkingMode {
    /// Accepts a bare JSON string or `[{"chunking_mode": ..}]`.
    pub fn from_response(body: &Value) -> Self {
        let raw = match body {
            Value::String(mode) => Some(mode.as_str()),
            Value::Array(items) => items
                .first()
                .and_then(|first| first.get("chunking_mode"))
                .and_then(Value::as_str),
            _ => None,
        };
        match raw {
            Some(mode) if mode.trim().eq_ignore_ascii_case("llm") => ChunkingMode::Llm,
            _ => ChunkingMode::Heuristic,
        }
    }
}

impl fmt::Display for ChunkingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkingMode::Heuristic => f.write_str("Heuristic"),
            ChunkingMode::Llm => f.write_str("LLM"),
        }
    }
}

/// One row of `v_rerank_events`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankEvent {
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub doc_id: Option<DocId>,
    #[serde(default)]
    pub seq: Option<i64>,
    #[serde(default)]
    pub rerank_score: Option<f64>,
    #[serde(default)]
    pub stage_distance: Option<f64>,
}

#[derive(Serialize)]
pub(crate) struct DeleteDocumentParams<'a> {
    pub p_id: &'a DocId,
}
