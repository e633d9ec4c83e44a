//! Search-response parsing and result aggregation.
//!
//! Every merge step takes the running [`ResultSet`] by value and returns the
//! updated set, so callers always continue from the returned value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::fhir::ResourceType;

const MAX_LOGGED_BODY: usize = 512;

/// One raw reply from the remote server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Records gathered during one query run, keyed by record type.
///
/// Types iterate in first-seen order; records within a type keep arrival
/// order and are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: IndexMap<String, Vec<Value>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record under its type, creating the list on first encounter.
    pub fn push(&mut self, resource_type: &ResourceType, record: Value) {
        self.records
            .entry(resource_type.to_string())
            .or_default()
            .push(record);
    }

    pub fn get(&self, resource_type: &ResourceType) -> &[Value] {
        self.records
            .get(resource_type.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn count(&self, resource_type: &ResourceType) -> usize {
        self.get(resource_type).len()
    }

    pub fn patients(&self) -> &[Value] {
        self.get(&ResourceType::Patient)
    }

    /// Total number of records across all types
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.records
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Per-type record counts in iteration order
    pub fn counts(&self) -> Vec<(String, usize)> {
        self.records
            .iter()
            .map(|(k, v)| (k.clone(), v.len()))
            .collect()
    }
}

/// Entry of a flattened result bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub resource: Value,
}

/// FHIR searchset bundle flattened from a [`ResultSet`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(rename = "type")]
    pub bundle_type: String,
    pub total: usize,
    #[serde(rename = "entry", default)]
    pub entries: Vec<BundleEntry>,
}

/// Parse one response and merge its records into `result_set`.
pub fn parse_response(mut result_set: ResultSet, response: &RawResponse) -> ResultSet {
    for (resource_type, record) in extract_records(response) {
        result_set.push(&resource_type, record);
    }
    result_set
}

/// Parse a batch of responses and merge them in input order.
///
/// Each response is parsed in full before any merge happens, so the result
/// never depends on which request finished first.
pub fn parse_batch(result_set: ResultSet, responses: &[RawResponse]) -> ResultSet {
    let parsed: Vec<Vec<(ResourceType, Value)>> = responses.iter().map(extract_records).collect();
    parsed
        .into_iter()
        .flatten()
        .fold(result_set, |mut acc, (resource_type, record)| {
            acc.push(&resource_type, record);
            acc
        })
}

/// Flatten a result set into a searchset bundle. Does not modify its input.
pub fn assemble_bundle(result_set: &ResultSet) -> ResultBundle {
    let entries: Vec<BundleEntry> = result_set
        .iter()
        .flat_map(|(_, records)| records.iter())
        .map(|record| BundleEntry {
            resource: record.clone(),
        })
        .collect();

    ResultBundle {
        resource_type: "Bundle".to_string(),
        bundle_type: "searchset".to_string(),
        total: entries.len(),
        entries,
    }
}

fn extract_records(response: &RawResponse) -> Vec<(ResourceType, Value)> {
    if !response.is_success() {
        warn!(
            path = %response.path,
            status = response.status,
            diagnostics = %diagnostics(&response.body),
            "remote server rejected search"
        );
        return Vec::new();
    }

    let body: Value = match serde_json::from_str(&response.body) {
        Ok(body) => body,
        Err(e) => {
            warn!(path = %response.path, error = %e, "search response is not valid JSON");
            return Vec::new();
        }
    };

    let Some(entries) = body.get("entry").and_then(Value::as_array) else {
        debug!(path = %response.path, "search response has no entries");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let typed = entry
            .get("resource")
            .and_then(|record| ResourceType::of(record).map(|t| (t, record.clone())));
        match typed {
            Some(pair) => records.push(pair),
            None => warn!(
                path = %response.path,
                index,
                "dropping search entry without a recognized resourceType"
            ),
        }
    }
    debug!(path = %response.path, records = records.len(), "parsed search response");
    records
}

/// Diagnostic text for a rejected search: OperationOutcome issue diagnostics
/// when present, otherwise the (truncated) body.
fn diagnostics(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && json.get("resourceType").and_then(Value::as_str) == Some("OperationOutcome")
        && let Some(issues) = json.get("issue").and_then(Value::as_array)
    {
        let msgs: Vec<&str> = issues
            .iter()
            .filter_map(|i| i.get("diagnostics").and_then(Value::as_str))
            .collect();
        if !msgs.is_empty() {
            return msgs.join("; ");
        }
    }
    body.chars().take(MAX_LOGGED_BODY).collect()
}
