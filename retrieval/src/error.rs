use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("Unknown retrieval mode: {0:?} (expected semantic, hybrid, semantic_rerank or hybrid_rerank)")]
    InvalidMode(String),

    #[error("Invalid retrieval settings: {0}")]
    InvalidSettings(String),

    #[error("Query is empty")]
    EmptyQuery,
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
