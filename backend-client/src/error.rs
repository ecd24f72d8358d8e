use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("{operation} failed: HTTP {status} {body}")]
    Transport {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The body could not be parsed as JSON at all.
    #[error("{operation} returned malformed JSON: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API root {url:?}: {source}")]
    InvalidApiRoot {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Request(#[from] ragpilot_retrieval::RetrievalError),
}

impl BackendError {
    /// HTTP status of a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Transport { status, .. } => Some(*status),
            BackendError::Http(err) => err.status().map(u16::from),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
