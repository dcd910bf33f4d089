//! Write a file on the host.

use std::path::PathBuf;

use uuid::Uuid;

use crate::system::System;
use crate::tasks::TaskResult;

/// Write `contents` to `path`, replacing whatever was there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutTask {
    id: Uuid,
    path: PathBuf,
    contents: String,
}

impl PutTask {
    pub const KEY: &'static str = "put";

    pub fn new(id: Uuid, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn run(&self, system: &dyn System) -> TaskResult {
        match system
            .write_file(&self.path, self.contents.as_bytes())
            .await
        {
            Ok(()) => TaskResult::success(
                self.id,
                format!(
                    "wrote {} bytes to {}",
                    self.contents.len(),
                    self.path.display()
                ),
            ),
            Err(e) => TaskResult::failure(
                self.id,
                format!("failed to write {}: {}", self.path.display(), e),
            ),
        }
    }
}
