//! HTTP client for the retrieval-augmented QA backend.
//!
//! [`BackendClient`] executes the search calls built by `ragpilot-retrieval`
//! and the auxiliary RPCs (documents, chat, ingest, status views).
//! [`PreviewSession`] combines dispatch, document labels and ranking with
//! last-issued-wins sequencing.

mod client;
mod error;
mod preview;
mod proto;

pub use client::{BackendClient, DEFAULT_API_ROOT};
pub use error::{BackendError, Result};
pub use preview::{Preview, PreviewSession};
pub use proto::{ChunkingMode, EmbeddingProgress, IngestStatusRow, RerankEvent};
