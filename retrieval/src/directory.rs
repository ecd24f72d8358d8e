use crate::candidate::DocId;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an RFC 3339 timestamp, or a zone-less one taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Serde adapter: unparseable or missing timestamps become `None`.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// One row of the document listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDirectoryEntry {
    pub id: DocId,
    /// Storage key shown to the operator (the object key of the upload).
    #[serde(rename = "s3_key", alias = "display_key")]
    pub display_key: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Read-only lookup from document id to a human-readable label.
pub trait DocumentDirectory {
    fn display_key(&self, id: &DocId) -> Option<&str>;
}

/// Directory used when the document listing could not be fetched.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDirectory;

impl DocumentDirectory for EmptyDirectory {
    fn display_key(&self, _id: &DocId) -> Option<&str> {
        None
    }
}

impl DocumentDirectory for HashMap<DocId, String> {
    fn display_key(&self, id: &DocId) -> Option<&str> {
        self.get(id).map(String::as_str)
    }
}

/// Snapshot of the document listing keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    keys: HashMap<DocId, String>,
}

impl DocumentIndex {
    pub fn new(entries: &[DocumentDirectoryEntry]) -> Self {
        // Later rows win on duplicate ids.
        let keys = entries
            .iter()
            .map(|entry| (entry.id.clone(), entry.display_key.clone()))
            .collect();
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<DocumentDirectoryEntry> for DocumentIndex {
    fn from_iter<I: IntoIterator<Item = DocumentDirectoryEntry>>(iter: I) -> Self {
        let keys = iter
            .into_iter()
            .map(|entry| (entry.id, entry.display_key))
            .collect();
        Self { keys }
    }
}

impl DocumentDirectory for DocumentIndex {
    fn display_key(&self, id: &DocId) -> Option<&str> {
        self.keys.get(id).map(String::as_str)
    }
}
