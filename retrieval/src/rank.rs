use crate::candidate::{DocId, RetrievedCandidate};
use crate::directory::DocumentDirectory;
use crate::mode::RetrievalMode;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Sort key for rows without a distance in distance-ordered modes.
const MISSING_DISTANCE: f64 = 0.0;
/// Sort key for unscored rows in rerank modes; sorts them last.
const MISSING_RERANK_SCORE: f64 = -1e6;
const SNIPPET_CHARS: usize = 240;

/// A ranked candidate ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    /// Position in the final list (1 = best)
    pub rank: usize,
    /// Document label, or `doc {id}` when the directory has no entry
    pub label: String,
    pub doc_id: Option<DocId>,
    pub seq: Option<i64>,
    pub distance: Option<f64>,
    pub rerank_score: Option<f64>,
    /// Chunk text with whitespace collapsed, cut to 240 characters
    pub snippet: String,
}

/// Filters, orders and labels search candidates for one mode.
#[derive(Debug, Clone, Copy)]
pub struct ResultRanker {
    mode: RetrievalMode,
    threshold: Option<f64>,
}

impl ResultRanker {
    /// `threshold` caps the staging distance; `None` or NaN disables it.
    pub fn new(mode: RetrievalMode, threshold: Option<f64>) -> Self {
        Self {
            mode,
            threshold: threshold.filter(|t| !t.is_nan()),
        }
    }

    pub fn rank_and_annotate(
        &self,
        candidates: Vec<RetrievedCandidate>,
        directory: &dyn DocumentDirectory,
    ) -> Vec<DisplayRow> {
        let total = candidates.len();
        let mut kept = self.apply_threshold(candidates);
        self.sort(&mut kept);
        debug!(
            mode = %self.mode,
            total,
            kept = kept.len(),
            "ranked search candidates"
        );

        kept.into_iter()
            .enumerate()
            .map(|(index, candidate)| annotate(index + 1, candidate, directory))
            .collect()
    }

    fn apply_threshold(&self, mut candidates: Vec<RetrievedCandidate>) -> Vec<RetrievedCandidate> {
        let Some(threshold) = self.threshold else {
            return candidates;
        };
        let rerank = self.mode.is_rerank();
        candidates.retain(|candidate| match candidate.distance {
            Some(distance) => distance <= threshold,
            // Rerank rows may only carry a score; the cap is on staging distance.
            None => rerank,
        });
        candidates
    }

    fn sort(&self, candidates: &mut [RetrievedCandidate]) {
        if self.mode.is_rerank() {
            candidates.sort_by(|a, b| descending(rerank_key(a), rerank_key(b)));
        } else {
            candidates.sort_by(|a, b| distance_key(a).total_cmp(&distance_key(b)));
        }
    }
}

fn distance_key(candidate: &RetrievedCandidate) -> f64 {
    candidate.distance.unwrap_or(MISSING_DISTANCE)
}

fn rerank_key(candidate: &RetrievedCandidate) -> f64 {
    candidate.rerank_score.unwrap_or(MISSING_RERANK_SCORE)
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn annotate(
    rank: usize,
    candidate: RetrievedCandidate,
    directory: &dyn DocumentDirectory,
) -> DisplayRow {
    let label = match &candidate.doc_id {
        Some(id) => directory
            .display_key(id)
            .map_or_else(|| format!("doc {id}"), str::to_string),
        None => "doc unknown".to_string(),
    };
    DisplayRow {
        rank,
        label,
        snippet: snippet(&candidate.chunk),
        doc_id: candidate.doc_id,
        seq: candidate.seq,
        distance: candidate.distance,
        rerank_score: candidate.rerank_score,
    }
}

fn snippet(chunk: &str) -> String {
    let collapsed = chunk.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(SNIPPET_CHARS).collect()
}

/// Filter by `threshold`, order by the mode's score, and label every row.
pub fn rank_and_annotate(
    candidates: Vec<RetrievedCandidate>,
    mode: RetrievalMode,
    threshold: Option<f64>,
    directory: &dyn DocumentDirectory,
) -> Vec<DisplayRow> {
    ResultRanker::new(mode, threshold).rank_and_annotate(candidates, directory)
}
