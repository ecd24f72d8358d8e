use crate::client::BackendClient;
use crate::error::Result;
use ragpilot_retrieval::{
    DisplayRow, DocumentIndex, Generation, RequestGenerations, RetrievalMode, RetrievalRequest,
    RetrievalSettings, WeightPair, effective_weights, rank_and_annotate,
};
use tracing::{debug, warn};

/// Ranked retrieval preview for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub generation: Generation,
    pub mode: RetrievalMode,
    /// Weights sent to the backend, `None` for semantic search
    pub weights: Option<WeightPair>,
    pub rows: Vec<DisplayRow>,
}

/// Issues retrieval previews and drops responses overtaken by a newer one.
#[derive(Clone, Debug)]
pub struct PreviewSession {
    client: BackendClient,
    generations: RequestGenerations,
}

impl PreviewSession {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            generations: RequestGenerations::new(),
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Search, then rank and label the rows.
    ///
    /// Returns `Ok(None)` when another preview was issued on this session
    /// before this one resolved, whether this one succeeded or failed. A
    /// query that fails validation is rejected without taking a generation,
    /// so it never supersedes a preview in flight. A failed document listing
    /// only costs the labels; the rows are still returned with placeholder
    /// names.
    pub async fn preview(
        &self,
        query: &str,
        settings: &RetrievalSettings,
    ) -> Result<Option<Preview>> {
        let weights = effective_weights(settings.mode, settings.smart, query, settings.base_weights());
        let request = RetrievalRequest::new(
            settings.mode,
            query,
            settings.top_k,
            weights,
            settings.stage_params(),
        )?;
        let generation = self.generations.issue();

        let candidates = match self.client.dispatch(&request).await {
            Ok(candidates) => candidates,
            Err(err) if !self.generations.is_latest(generation) => {
                debug!(generation = generation.get(), %err, "discarding superseded preview failure");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let directory = match self.client.list_documents().await {
            Ok(entries) => DocumentIndex::new(&entries),
            Err(err) => {
                warn!(%err, "document listing unavailable; using placeholder labels");
                DocumentIndex::default()
            }
        };

        if !self.generations.is_latest(generation) {
            debug!(generation = generation.get(), "discarding superseded preview");
            return Ok(None);
        }

        let rows = rank_and_annotate(candidates, settings.mode, settings.threshold, &directory);
        Ok(Some(Preview {
            generation,
            mode: settings.mode,
            weights: request.weights(),
            rows,
        }))
    }
}
