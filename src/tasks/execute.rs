//! Shell command execution.

use uuid::Uuid;

use crate::system::System;
use crate::tasks::TaskResult;

/// Default cap on captured output (1 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// Run a command through the platform shell.
///
/// The result carries stdout followed by stderr, capped at the configured
/// size. Success means the process exited with code zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteTask {
    id: Uuid,
    command: String,
}

impl ExecuteTask {
    pub const KEY: &'static str = "execute";

    pub fn new(id: Uuid, command: impl Into<String>) -> Self {
        Self {
            id,
            command: command.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn run(&self, system: &dyn System, max_output_bytes: usize) -> TaskResult {
        let output = match system.run_shell(&self.command, max_output_bytes).await {
            Ok(output) => output,
            Err(e) => {
                return TaskResult::failure(self.id, format!("failed to spawn command: {}", e));
            }
        };

        if output.exit_code.is_none() {
            tracing::debug!(command = %self.command, "Command terminated by signal");
        }

        let success = output.succeeded();
        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        let contents = truncate_output(
            &String::from_utf8_lossy(&combined),
            max_output_bytes,
            output.truncated,
        );

        TaskResult::new(self.id, contents, success)
    }
}

/// Cap `text` at `max_bytes`, cutting on a character boundary.
///
/// The marker is appended when `text` is too long or when the capture
/// already dropped bytes.
fn truncate_output(text: &str, max_bytes: usize, already_cut: bool) -> String {
    if text.len() <= max_bytes && !already_cut {
        return text.to_string();
    }

    let mut end = max_bytes.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = text[..end].to_string();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
