use crate::error::{BackendError, Result};
use crate::proto::{ChunkingMode, DeleteDocumentParams, IngestStatusRow, RerankEvent};
use ragpilot_retrieval::{
    ChatRequest, DocId, DocumentDirectoryEntry, RetrievalRequest, RetrievedCandidate, RpcCall,
    normalize_candidates, normalize_chat_answer,
};
use reqwest::Response;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_API_ROOT: &str = "http://127.0.0.1:3000/api";

const LIST_DOCUMENTS: &str = "rpc/list_documents";
const DELETE_DOCUMENT: &str = "rpc/delete_document";
const DELETE_ALL_DOCUMENTS: &str = "rpc/delete_all_documents";
const RUN_INGEST_ONCE: &str = "rpc/run_ingest_once";
const CHUNKING_MODE: &str = "rpc/chunking_mode";
const INGEST_STATUS: &str = "v_ingest_status";
const VECTORIZER_STATUS: &str = "v_vectorizer_status";
const VECTORIZER_WORKER_PROGRESS: &str = "v_vectorizer_worker_progress";
const RERANK_EVENTS: &str = "v_rerank_events";

/// Client for the backend's JSON/HTTP RPC surface.
///
/// No request timeout is configured; a hung call is bounded by the transport.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    api_root: Url,
}

impl BackendClient {
    pub fn new(api_root: &str) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Self::with_http(api_root, http)
    }

    pub fn with_http(api_root: &str, http: reqwest::Client) -> Result<Self> {
        let mut normalized = api_root.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let api_root = Url::parse(&normalized).map_err(|source| BackendError::InvalidApiRoot {
            url: api_root.to_string(),
            source,
        })?;
        Ok(Self { http, api_root })
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.api_root
            .join(path)
            .map_err(|source| BackendError::InvalidApiRoot {
                url: format!("{}{path}", self.api_root),
                source,
            })
    }

    /// Run one search call and flatten its rows. Never retried.
    pub async fn dispatch(&self, request: &RetrievalRequest) -> Result<Vec<RetrievedCandidate>> {
        let RpcCall { endpoint, payload } = request.call();
        let body = self.post_json("search", endpoint, &payload).await?;
        let candidates = normalize_candidates(&body);
        debug!(
            endpoint,
            mode = %request.mode(),
            count = candidates.len(),
            "search returned"
        );
        Ok(candidates)
    }

    /// Ask the answer generator; the reply is plain text.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let RpcCall { endpoint, payload } = request.call();
        let resp = self.http.post(self.url(endpoint)?).json(&payload).send().await?;
        let resp = ensure_success("chat", resp).await?;
        if is_json(&resp) {
            let body = read_json("chat", resp).await?;
            Ok(normalize_chat_answer(&body))
        } else {
            Ok(resp.text().await?)
        }
    }

    /// Document listing: GET first, POST with an empty body as fallback.
    pub async fn list_documents(&self) -> Result<Vec<DocumentDirectoryEntry>> {
        let url = self.url(LIST_DOCUMENTS)?;
        let mut resp = self.http.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            debug!(status = %resp.status(), "GET list_documents failed; retrying with POST");
            resp = self.http.post(url).json(&json!({})).send().await?;
        }
        let resp = ensure_success("list documents", resp).await?;
        let body = read_json("list documents", resp).await?;
        Ok(parse_documents(body))
    }

    pub async fn delete_document(&self, id: &DocId) -> Result<()> {
        self.post_json(
            "delete document",
            DELETE_DOCUMENT,
            &json!(DeleteDocumentParams { p_id: id }),
        )
        .await?;
        info!(%id, "deleted document");
        Ok(())
    }

    pub async fn delete_all_documents(&self) -> Result<()> {
        self.post_json("delete all documents", DELETE_ALL_DOCUMENTS, &json!({}))
            .await?;
        info!("deleted all documents");
        Ok(())
    }

    /// Trigger one ingest run. Empty, JSON and text bodies all count as success.
    pub async fn run_ingest_once(&self) -> Result<()> {
        let resp = self
            .http
            .post(self.url(RUN_INGEST_ONCE)?)
            .json(&json!({}))
            .send()
            .await?;
        let resp = ensure_success("ingest", resp).await?;
        // The body carries nothing we use; a read failure is not an ingest failure.
        if let Err(err) = resp.bytes().await {
            debug!(%err, "ignoring unreadable ingest response body");
        }
        info!("ingest triggered");
        Ok(())
    }

    pub async fn ingest_status(&self) -> Result<Vec<IngestStatusRow>> {
        let body = self.get_json("ingest status", INGEST_STATUS).await?;
        Ok(parse_rows("ingest status", body))
    }

    pub async fn vectorizer_status(&self) -> Result<Value> {
        self.get_json("vectorizer status", VECTORIZER_STATUS).await
    }

    pub async fn vectorizer_worker_progress(&self) -> Result<Value> {
        self.get_json("vectorizer worker progress", VECTORIZER_WORKER_PROGRESS)
            .await
    }

    /// Chunking mode, defaulting to heuristic when the RPC is unavailable.
    pub async fn chunking_mode(&self) -> ChunkingMode {
        match self.try_chunking_mode().await {
            Ok(mode) => mode,
            Err(err) => {
                warn!(%err, "chunking mode unavailable; assuming heuristic");
                ChunkingMode::Heuristic
            }
        }
    }

    async fn try_chunking_mode(&self) -> Result<ChunkingMode> {
        let url = self.url(CHUNKING_MODE)?;
        // Volatile functions need POST; stable ones may only be exposed via GET.
        let resp = self.http.post(url.clone()).json(&json!({})).send().await?;
        let resp = if resp.status().is_success() {
            resp
        } else {
            debug!(status = %resp.status(), "POST chunking_mode failed; retrying with GET");
            let fallback = self.http.get(url).send().await?;
            ensure_success("chunking mode", fallback).await?
        };
        let body = read_json("chunking mode", resp).await?;
        Ok(ChunkingMode::from_response(&body))
    }

    /// Most recent rerank events, newest first.
    pub async fn rerank_events(&self, limit: usize) -> Result<Vec<RerankEvent>> {
        let resp = self
            .http
            .get(self.url(RERANK_EVENTS)?)
            .query(&[
                ("limit", limit.to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        let resp = ensure_success("rerank events", resp).await?;
        let body = read_json("rerank events", resp).await?;
        Ok(parse_rows("rerank events", body))
    }

    async fn post_json(
        &self,
        operation: &'static str,
        endpoint: &str,
        payload: &Value,
    ) -> Result<Value> {
        let resp = self.http.post(self.url(endpoint)?).json(payload).send().await?;
        let resp = ensure_success(operation, resp).await?;
        read_json(operation, resp).await
    }

    async fn get_json(&self, operation: &'static str, endpoint: &str) -> Result<Value> {
        let resp = self.http.get(self.url(endpoint)?).send().await?;
        let resp = ensure_success(operation, resp).await?;
        read_json(operation, resp).await
    }
}

async fn ensure_success(operation: &'static str, resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Transport {
        operation,
        status,
        body,
    })
}

fn is_json(resp: &Response) -> bool {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

/// An empty body (e.g. 204 No Content) reads as JSON `null`.
async fn read_json(operation: &'static str, resp: Response) -> Result<Value> {
    let bytes = resp.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|source| BackendError::Decode { operation, source })
}

fn parse_documents(body: Value) -> Vec<DocumentDirectoryEntry> {
    parse_rows("list documents", body)
}

/// Parse each array element on its own so one bad row does not drop the rest.
fn parse_rows<T: serde::de::DeserializeOwned>(operation: &'static str, body: Value) -> Vec<T> {
    let Value::Array(items) = body else {
        if !body.is_null() {
            warn!(operation, "expected an array of rows");
        }
        return Vec::new();
    };
    let total = items.len();
    let rows: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if rows.len() < total {
        warn!(operation, skipped = total - rows.len(), "ignored malformed rows");
    }
    rows
}
