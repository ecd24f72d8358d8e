use crate::error::{Result, RetrievalError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Retrieval strategy selected by the operator for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Plain nearest-neighbor search over embeddings
    #[default]
    Semantic,
    /// Lexical and semantic scores fused with a weight pair
    Hybrid,
    /// Semantic staging search followed by a rerank pass
    SemanticRerank,
    /// Hybrid staging search followed by a rerank pass
    HybridRerank,
}

/// First-pass search used by the rerank modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageMode {
    Semantic,
    Hybrid,
}

impl RetrievalMode {
    pub const ALL: [RetrievalMode; 4] = [
        RetrievalMode::Semantic,
        RetrievalMode::Hybrid,
        RetrievalMode::SemanticRerank,
        RetrievalMode::HybridRerank,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RetrievalMode::Semantic => "semantic",
            RetrievalMode::Hybrid => "hybrid",
            RetrievalMode::SemanticRerank => "semantic_rerank",
            RetrievalMode::HybridRerank => "hybrid_rerank",
        }
    }

    /// Whether a rerank pass runs, which switches ordering to rerank score.
    pub fn is_rerank(self) -> bool {
        self.stage_mode().is_some()
    }

    /// Whether the backend call carries a weight pair.
    pub fn uses_weights(self) -> bool {
        !matches!(self, RetrievalMode::Semantic)
    }

    pub fn stage_mode(self) -> Option<StageMode> {
        match self {
            RetrievalMode::Semantic | RetrievalMode::Hybrid => None,
            RetrievalMode::SemanticRerank => Some(StageMode::Semantic),
            RetrievalMode::HybridRerank => Some(StageMode::Hybrid),
        }
    }
}

impl StageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StageMode::Semantic => "semantic",
            StageMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalMode {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| RetrievalError::InvalidMode(s.to_string()))
    }
}
