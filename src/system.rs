//! Host capabilities used by tasks.
//!
//! Tasks never touch the OS directly. They go through [`System`], which keeps
//! the task logic testable and lets an embedder restrict or redirect what the
//! agent can reach.

use std::io;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Captured output of a shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Set when either stream produced more than the capture limit.
    pub truncated: bool,
}

impl ShellOutput {
    /// Whether the command exited with code zero.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A single directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name, without the parent path.
    pub name: String,
    pub is_dir: bool,
}

/// OS capabilities required by the task variants.
#[async_trait]
pub trait System: Send + Sync {
    /// Run a command through the platform shell and wait for it to finish.
    ///
    /// At most `capture_limit` bytes of each stream are kept. The rest is
    /// read and discarded so the child never blocks on a full pipe.
    async fn run_shell(&self, command: &str, capture_limit: usize) -> io::Result<ShellOutput>;

    /// Read an entire file.
    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write a file, replacing any existing contents.
    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// List the immediate children of a directory.
    async fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
}

/// [`System`] backed by the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSystem;

impl LocalSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl System for LocalSystem {
    async fn run_shell(&self, command: &str, capture_limit: usize) -> io::Result<ShellOutput> {
        let mut child = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("stderr was not piped"))?;

        let (status, (stdout, stdout_cut), (stderr, stderr_cut)) = tokio::try_join!(
            child.wait(),
            capture(stdout, capture_limit),
            capture(stderr, capture_limit),
        )?;

        Ok(ShellOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            truncated: stdout_cut || stderr_cut,
        })
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }

    async fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut reader = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            let is_dir = entry.file_type().await?.is_dir();
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }

        Ok(entries)
    }
}

/// Keep the first `limit` bytes of `reader` and drain the rest.
///
/// Returns the kept bytes and whether anything was discarded.
async fn capture<R>(mut reader: R, limit: usize) -> io::Result<(Vec<u8>, bool)>
where
    R: AsyncRead + Unpin,
{
    let mut kept = Vec::new();
    (&mut reader)
        .take(limit as u64)
        .read_to_end(&mut kept)
        .await?;
    let discarded = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok((kept, discarded > 0))
}

#[cfg(unix)]
fn shell_command(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let system = LocalSystem::new();

        system.write_file(&path, b"first").await.unwrap();
        system.write_file(&path, b"second").await.unwrap();

        assert_eq!(system.read_file(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_list_dir_marks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("file"), "x").unwrap();

        let mut entries = LocalSystem.list_dir(dir.path()).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![
                DirEntry {
                    name: "file".to_string(),
                    is_dir: false
                },
                DirEntry {
                    name: "sub".to_string(),
                    is_dir: true
                },
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_shell_captures_streams() {
        let output = LocalSystem
            .run_shell("echo out; echo err 1>&2; exit 3", 1024)
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout, b"out\n");
        assert_eq!(output.stderr, b"err\n");
        assert!(!output.truncated);
        assert!(!output.succeeded());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_shell_caps_buffered_output() {
        let output = LocalSystem
            .run_shell("head -c 50000000 /dev/zero; echo done 1>&2", 1024)
            .await
            .unwrap();

        assert_eq!(output.stdout.len(), 1024);
        assert_eq!(output.stderr, b"done\n");
        assert!(output.truncated);
        assert!(output.succeeded());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_shell_output_at_limit_is_not_truncated() {
        let output = LocalSystem.run_shell("printf abcd", 4).await.unwrap();

        assert_eq!(output.stdout, b"abcd");
        assert!(!output.truncated);
    }
}
