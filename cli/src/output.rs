//! Plain-text rendering for command output.

use ragpilot_backend_client::RerankEvent;
use ragpilot_retrieval::{DisplayRow, DocumentDirectoryEntry, RetrievalMode, WeightPair};

const EVENT_QUERY_CHARS: usize = 48;

/// Note describing which weights a search actually used.
pub fn weights_note(mode: RetrievalMode, smart: bool, weights: Option<WeightPair>) -> String {
    let weights = match (mode, weights) {
        (RetrievalMode::Semantic | RetrievalMode::SemanticRerank, _) | (_, None) => {
            return "Semantic mode: weights are not used".to_string();
        }
        (_, Some(weights)) => weights,
    };
    let label = if mode == RetrievalMode::Hybrid && smart {
        "Effective weights (smart)"
    } else {
        "Effective weights"
    };
    format!(
        "{label}: lex={:.2}, sem={:.2}",
        weights.lexical, weights.semantic
    )
}

/// `{rank}. {label}  #{seq}  score=..|dist=..` followed by the indented snippet.
pub fn format_row(row: &DisplayRow, mode: RetrievalMode) -> String {
    let seq = row
        .seq
        .map_or_else(|| "?".to_string(), |seq| seq.to_string());
    let score = if mode.is_rerank() {
        format!("score={}", fixed(row.rerank_score, 4))
    } else {
        format!("dist={}", fixed(row.distance, 4))
    };
    format!(
        "{}. {}  #{seq}  {score}\n   {}",
        row.rank, row.label, row.snippet
    )
}

pub fn format_rows(rows: &[DisplayRow], mode: RetrievalMode) -> String {
    if rows.is_empty() {
        return "(no results)".to_string();
    }
    rows.iter()
        .map(|row| format_row(row, mode))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answer for "which documents do you have?" style questions.
pub fn document_listing_answer(entries: &[DocumentDirectoryEntry]) -> String {
    let lines = if entries.is_empty() {
        "(none)".to_string()
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {}", i + 1, entry.display_key))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("The documents I have are:\n\n{lines}")
}

pub fn format_document(entry: &DocumentDirectoryEntry) -> String {
    let created = entry
        .created_at
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    format!("{:>6}  {}  {created}", entry.id.as_str(), entry.display_key)
        .trim_end()
        .to_string()
}

pub fn format_rerank_event(event: &RerankEvent) -> String {
    let ts = event
        .created_at
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    let query: String = event
        .query
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(EVENT_QUERY_CHARS)
        .collect();
    let doc = event
        .doc_id
        .as_ref()
        .map_or_else(|| "?".to_string(), ToString::to_string);
    let seq = event
        .seq
        .map_or_else(|| "?".to_string(), |seq| seq.to_string());
    format!(
        "{ts}  q=\"{query}\" doc={doc} seq={seq} score={} dist={}",
        fixed(event.rerank_score, 3),
        fixed(event.stage_distance, 3)
    )
}

fn fixed(value: Option<f64>, digits: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.digits$}"))
}
