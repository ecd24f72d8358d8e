/*!
# ragpilot retrieval

Retrieval-mode orchestration for a retrieval-augmented QA backend:
- **Weight blending**: per-query lexical/semantic weights from text heuristics
- **Call shapes**: one exhaustive mapping from retrieval mode to RPC endpoint and payload
- **Response normalization**: tolerant parsing of search rows
- **Ranking**: threshold filtering, mode-aware ordering, document labels
- **Request generations**: last-issued-wins sequencing for overlapping previews

Nothing in this crate performs I/O; `ragpilot-backend-client` executes the
calls built here.

## Pipeline

```text
Query + settings
  ├─> blend_weights (hybrid + smart only)
  ├─> RetrievalRequest::new(mode, ..).call()  ->  RpcCall { endpoint, payload }
  │     └─> backend (network)
  ├─> normalize_candidates(body)
  └─> rank_and_annotate(candidates, mode, threshold, directory)
        └─> DisplayRow[]
```

## Example

```rust
use ragpilot_retrieval::{
    EmptyDirectory, RetrievalMode, RetrievalRequest, RetrievalSettings, effective_weights,
    normalize_candidates, rank_and_annotate,
};

let settings = RetrievalSettings {
    mode: RetrievalMode::Hybrid,
    ..Default::default()
};
let query = "PTO-2024 policy";
let weights = effective_weights(settings.mode, settings.smart, query, settings.base_weights());
let request = RetrievalRequest::new(
    settings.mode,
    query,
    settings.top_k,
    weights,
    settings.stage_params(),
)?;
assert_eq!(request.call().endpoint, "rpc/search_chunks_hybrid");

let body = serde_json::json!([{"doc_id": 3, "seq": 0, "chunk": "PTO accrues monthly", "distance": 0.12}]);
let rows = rank_and_annotate(normalize_candidates(&body), settings.mode, None, &EmptyDirectory);
assert_eq!(rows[0].label, "doc 3");
# Ok::<(), ragpilot_retrieval::RetrievalError>(())
```
*/

mod candidate;
mod chat;
mod config;
mod directory;
mod error;
mod generation;
mod mode;
mod rank;
mod request;
mod weights;

pub use candidate::{DocId, RetrievedCandidate, normalize_candidates};
pub use chat::{
    CHAT_RAG_OPTS, ChatRequest, DEFAULT_PIN_SEM, is_document_listing_intent,
    normalize_chat_answer,
};
pub use config::{DEFAULT_RERANK_MODEL, RetrievalSettings};
pub use directory::{
    DocumentDirectory, DocumentDirectoryEntry, DocumentIndex, EmptyDirectory, deserialize_timestamp,
    parse_timestamp,
};
pub use error::{Result, RetrievalError};
pub use generation::{Generation, RequestGenerations};
pub use mode::{RetrievalMode, StageMode};
pub use rank::{DisplayRow, ResultRanker, rank_and_annotate};
pub use request::{
    DEFAULT_STAGE_K, DEFAULT_TOP_K, RetrievalRequest, RpcCall, SEARCH_CHUNKS,
    SEARCH_CHUNKS_HYBRID, SEARCH_CHUNKS_RERANK, StageParams, normalize_rerank_model,
    resolve_stage_k, resolve_top_k,
};
pub use weights::{
    DEFAULT_LEXICAL_WEIGHT, DEFAULT_SEMANTIC_WEIGHT, QuerySignals, WeightPair, blend_weights,
    effective_weights,
};
