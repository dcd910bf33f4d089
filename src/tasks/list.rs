//! Recursive directory listing.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::system::{DirEntry, System};
use crate::tasks::TaskResult;

/// List entries under `path`, descending `depth` extra levels.
///
/// `depth == 0` lists immediate children only. Output is one path per line,
/// relative to `path`, sorted, with directories suffixed by `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTask {
    id: Uuid,
    path: PathBuf,
    depth: u8,
}

impl ListTask {
    pub const KEY: &'static str = "list";

    pub fn new(id: Uuid, path: impl Into<PathBuf>, depth: u8) -> Self {
        Self {
            id,
            path: path.into(),
            depth,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn run(&self, system: &dyn System) -> TaskResult {
        // The root must be readable; failures below it only prune the subtree.
        let root = match system.list_dir(&self.path).await {
            Ok(entries) => entries,
            Err(e) => {
                return TaskResult::failure(
                    self.id,
                    format!("failed to list {}: {}", self.path.display(), e),
                );
            }
        };

        let mut lines = Vec::new();
        let mut pending: Vec<(PathBuf, u8, Vec<DirEntry>)> =
            vec![(PathBuf::new(), 0, root)];

        while let Some((relative, level, entries)) = pending.pop() {
            for entry in entries {
                let child = relative.join(&entry.name);
                if entry.is_dir {
                    lines.push(format!("{}/", display(&child)));
                    if level < self.depth {
                        match system.list_dir(&self.path.join(&child)).await {
                            Ok(children) => pending.push((child, level + 1, children)),
                            Err(e) => tracing::debug!(
                                path = %self.path.join(&child).display(),
                                error = %e,
                                "Skipping unreadable directory"
                            ),
                        }
                    }
                } else {
                    lines.push(display(&child));
                }
            }
        }

        lines.sort();
        TaskResult::success(self.id, lines.join("\n"))
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
