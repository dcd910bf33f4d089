//! Outcome of a single task.

use uuid::Uuid;

/// Immutable outcome of one task run.
///
/// The id is always the id of the task that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    id: Uuid,
    contents: String,
    success: bool,
}

impl TaskResult {
    /// Create a result.
    pub fn new(id: Uuid, contents: impl Into<String>, success: bool) -> Self {
        Self {
            id,
            contents: contents.into(),
            success,
        }
    }

    /// Create a successful result.
    pub fn success(id: Uuid, contents: impl Into<String>) -> Self {
        Self::new(id, contents, true)
    }

    /// Create a failed result carrying a diagnostic.
    pub fn failure(id: Uuid, diagnostic: impl Into<String>) -> Self {
        Self::new(id, diagnostic, false)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Split into owned parts.
    pub fn into_parts(self) -> (Uuid, String, bool) {
        (self.id, self.contents, self.success)
    }
}
