//! Wire format shared with the control endpoint.
//!
//! Inbound bodies carry task nodes; outbound bodies carry results keyed by
//! task id:
//!
//! ```text
//! {"<task id>": {"contents": "...", "success": true}, ...}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::DecodeError;
use crate::tasks::TaskResult;

/// Split a response body into individual task nodes.
///
/// Accepts a JSON array of nodes, an object with a `tasks` array, or an
/// object whose values are nodes. An empty body is an empty batch.
pub fn parse_batch(body: &str) -> Result<Vec<Value>, DecodeError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

    match value {
        Value::Array(nodes) => Ok(nodes),
        Value::Object(mut map) => match map.remove("tasks") {
            Some(Value::Array(nodes)) => Ok(nodes),
            Some(other) => Err(DecodeError::InvalidBatch {
                found: format!("'tasks' as {}", json_kind(&other)),
            }),
            None => Ok(map.into_iter().map(|(_, node)| node).collect()),
        },
        Value::Null => Ok(Vec::new()),
        other => Err(DecodeError::InvalidBatch {
            found: json_kind(&other).to_string(),
        }),
    }
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

/// Wire form of a single result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub contents: String,
    pub success: bool,
}

/// Results collected during one cycle, keyed by task id.
///
/// A second result with the same id replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: BTreeMap<Uuid, ResultEntry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a result into the set.
    pub fn insert(&mut self, result: TaskResult) {
        let (id, contents, success) = result.into_parts();
        if self
            .entries
            .insert(id, ResultEntry { contents, success })
            .is_some()
        {
            tracing::debug!(task_id = %id, "Replaced earlier result with the same id");
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&ResultEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Serialize the set as a request payload.
    pub fn to_payload(&self) -> String {
        match serde_json::to_string(self) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, entries = self.len(), "Failed to serialize results");
                "{}".to_string()
            }
        }
    }

    /// Serialize the set and leave it empty.
    pub fn take_payload(&mut self) -> String {
        let payload = self.to_payload();
        self.clear();
        payload
    }

    /// Parse a payload produced by [`ResultSet::to_payload`].
    pub fn from_payload(payload: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(payload).map_err(|e| DecodeError::InvalidJson(e.to_string()))
    }
}
