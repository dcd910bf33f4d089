//! Read a file from the host.

use std::path::PathBuf;

use uuid::Uuid;

use crate::system::System;
use crate::tasks::TaskResult;

/// Return the contents of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTask {
    id: Uuid,
    path: PathBuf,
}

impl GetTask {
    pub const KEY: &'static str = "get";

    pub fn new(id: Uuid, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn run(&self, system: &dyn System) -> TaskResult {
        match system.read_file(&self.path).await {
            Ok(bytes) => TaskResult::success(self.id, String::from_utf8_lossy(&bytes)),
            Err(e) => TaskResult::failure(
                self.id,
                format!("failed to read {}: {}", self.path.display(), e),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::LocalSystem;

    #[tokio::test]
    async fn test_get_returns_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostname");
        std::fs::write(&path, "box\n").unwrap();

        let id = Uuid::new_v4();
        let result = GetTask::new(id, &path).run(&LocalSystem).await;

        assert_eq!(result.id(), id);
        assert_eq!(result.contents(), "box\n");
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_get_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let result = GetTask::new(id, dir.path().join("nope"))
            .run(&LocalSystem)
            .await;

        assert_eq!(result.id(), id);
        assert!(!result.is_success());
        assert!(result.contents().starts_with("failed to read"));
    }

    #[tokio::test]
    async fn test_get_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = GetTask::new(Uuid::new_v4(), dir.path())
            .run(&LocalSystem)
            .await;

        assert!(!result.is_success());
    }
}
