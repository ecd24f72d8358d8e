use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Backend document identifier.
///
/// The backend emits numeric ids, but ids are compared by their textual form
/// so `7` and `"7"` refer to the same document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric ids and non-empty strings are accepted; anything else is absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(number_text(n))),
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self.0.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(self.0.clone()),
        }
    }
}

/// Integral floats (`7.0`) use the integer form so they match `7`.
fn number_text(n: &serde_json::Number) -> String {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() < 9.0e15
    {
        return (f as i64).to_string();
    }
    n.to_string()
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for DocId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for DocId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DocId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DocId::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid document id: {value}")))
    }
}

/// One chunk returned by a search RPC.
///
/// `distance` comes from the staging search (lower is closer); `rerank_score`
/// is only present when a rerank pass ran (higher is closer).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievedCandidate {
    pub doc_id: Option<DocId>,
    pub seq: Option<i64>,
    pub chunk: String,
    pub distance: Option<f64>,
    pub rerank_score: Option<f64>,
}

impl RetrievedCandidate {
    /// Build a candidate from one backend row, tolerating missing or mistyped fields.
    pub fn from_row(row: &Map<String, Value>) -> Self {
        Self {
            doc_id: row.get("doc_id").and_then(DocId::from_json),
            seq: row.get("seq").and_then(Value::as_i64),
            chunk: row
                .get("chunk")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            distance: row.get("distance").and_then(Value::as_f64),
            rerank_score: row.get("rerank_score").and_then(Value::as_f64),
        }
    }
}

const ROW_FIELDS: [&str; 5] = ["doc_id", "seq", "chunk", "distance", "rerank_score"];

fn looks_like_row(object: &Map<String, Value>) -> bool {
    ROW_FIELDS.iter().any(|field| object.contains_key(*field))
}

/// The single array-valued field of a wrapper object such as
/// `{"search_chunks": [...]}`.
fn wrapped_rows(object: &Map<String, Value>) -> Option<&Vec<Value>> {
    let mut arrays = object.values().filter_map(Value::as_array);
    match (arrays.next(), arrays.next()) {
        (Some(rows), None) => Some(rows),
        _ => None,
    }
}

fn collect_rows(items: &[Value]) -> Vec<RetrievedCandidate> {
    let mut skipped = 0usize;
    let candidates: Vec<RetrievedCandidate> = items
        .iter()
        .filter_map(|item| match item.as_object() {
            Some(row) => Some(RetrievedCandidate::from_row(row)),
            None => {
                skipped += 1;
                None
            }
        })
        .collect();
    if skipped > 0 {
        warn!(skipped, "ignored non-object rows in search response");
    }
    candidates
}

/// Flatten any supported search response shape into candidates.
///
/// Accepted: a bare array of rows, a one-element array wrapping an object
/// whose only array field holds the rows, a single row object, or an object
/// wrapping a row array. `null` and scalars yield no candidates.
pub fn normalize_candidates(body: &Value) -> Vec<RetrievedCandidate> {
    let candidates = match body {
        Value::Array(items) => match items.as_slice() {
            [Value::Object(only)] if !looks_like_row(only) => match wrapped_rows(only) {
                Some(rows) => collect_rows(rows),
                None => collect_rows(items),
            },
            _ => collect_rows(items),
        },
        Value::Object(object) if looks_like_row(object) => {
            vec![RetrievedCandidate::from_row(object)]
        }
        Value::Object(object) => match wrapped_rows(object) {
            Some(rows) => collect_rows(rows),
            None => {
                warn!("search response object carries no rows");
                Vec::new()
            }
        },
        Value::Null => Vec::new(),
        other => {
            warn!(shape = %json_kind(other), "unexpected scalar search response");
            Vec::new()
        }
    };
    debug!(count = candidates.len(), "normalized search response");
    candidates
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
