//! Execution channel: runs one composed command line through the tool.

use crate::error::{BirdwatcherError, BirdwatcherResult};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Tool flag that runs the following argument as a command line and exits.
pub const BATCH_FLAG: &str = "-olc";

/// Runs a fully composed command line and returns its raw standard output.
///
/// Implementations block until the command finishes or `timeout_secs`
/// elapses. Output is returned verbatim; payload extraction happens later.
pub trait Executor {
    fn execute(&self, command: &str, timeout_secs: u64) -> BirdwatcherResult<String>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, command: &str, timeout_secs: u64) -> BirdwatcherResult<String> {
        (**self).execute(command, timeout_secs)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, command: &str, timeout_secs: u64) -> BirdwatcherResult<String> {
        (**self).execute(command, timeout_secs)
    }
}

/// Spawns the birdwatcher executable once per command.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    binary: PathBuf,
}

impl ProcessExecutor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, command: &str, timeout_secs: u64) -> BirdwatcherResult<String> {
        let started = Instant::now();
        let deadline = started.checked_add(Duration::from_secs(timeout_secs));
        tracing::debug!(binary = %self.binary.display(), command, timeout_secs, "Running birdwatcher");

        let mut child = Command::new(&self.binary)
            .arg(BATCH_FLAG)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| BirdwatcherError::BinaryMissing {
                path: self.binary.display().to_string(),
                reason: err.to_string(),
            })?;

        // Both pipes are drained concurrently so a chatty child cannot block
        // on a full pipe while we wait on it.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = match child.wait_timeout(Duration::from_secs(timeout_secs))? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(command, timeout_secs, "Birdwatcher command timed out");
                return Err(BirdwatcherError::Timeout {
                    seconds: timeout_secs,
                });
            }
        };

        // A grandchild that inherited the pipes can keep them open after the
        // child exits; collecting output shares the same deadline.
        let (stdout, stderr) = match (collect(&stdout, deadline), collect(&stderr, deadline)) {
            (Some(out), Some(err)) => (out?, err?),
            _ => {
                tracing::warn!(command, timeout_secs, "Birdwatcher output still open at deadline");
                return Err(BirdwatcherError::Timeout {
                    seconds: timeout_secs,
                });
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if status.success() {
            tracing::debug!(command, elapsed_ms, bytes = stdout.len(), "Birdwatcher command finished");
            return Ok(stdout);
        }

        let diagnostic = if stderr.trim().is_empty() { stdout } else { stderr };
        let err = BirdwatcherError::from_failure_text(diagnostic);
        tracing::warn!(command, elapsed_ms, exit_code = ?status.code(), error = %err, "Birdwatcher command failed");
        Err(err)
    }
}

fn spawn_reader<R>(pipe: Option<R>) -> Receiver<io::Result<String>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match pipe {
            Some(mut pipe) => pipe.read_to_end(&mut buf).map(|_| ()),
            None => Ok(()),
        };
        let _ = tx.send(result.map(|()| String::from_utf8_lossy(&buf).into_owned()));
    });
    rx
}

/// Output of one reader, or `None` if it is still open at `deadline`.
fn collect(
    rx: &Receiver<io::Result<String>>,
    deadline: Option<Instant>,
) -> Option<io::Result<String>> {
    let received = match deadline {
        Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(result) => Some(result),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => {
            Some(Err(io::Error::other("output reader thread panicked")))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Serializes script creation and execution so a concurrent fork cannot
    // inherit a script's write handle (ETXTBSY).
    static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

    fn script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("birdwatcher");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn run(body: &str, command: &str, timeout_secs: u64) -> BirdwatcherResult<String> {
        let _guard = SCRIPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();
        let exec = ProcessExecutor::new(script(&dir, body));
        exec.execute(command, timeout_secs)
    }

    #[test]
    fn test_passes_batch_flag_and_command() {
        let out = run(r#"printf '%s|%s' "$1" "$2""#, "show session --format json", 10).unwrap();
        assert_eq!(out, "-olc|show session --format json");
    }

    #[test]
    fn test_stdout_is_verbatim() {
        let out = run("echo 'Using meta path: by-dev/meta'; echo '[]'", "show session", 10).unwrap();
        assert_eq!(out, "Using meta path: by-dev/meta\n[]\n");
    }

    #[test]
    fn test_connection_failure_classified() {
        let err = run("echo 'Failed to connect to etcd' >&2; exit 1", "show session", 10).unwrap_err();
        assert!(err.is_connection(), "got {err:?}");
    }

    #[test]
    fn test_command_failure_falls_back_to_stdout() {
        let err = run("echo 'unknown command shw'; exit 2", "shw", 10).unwrap_err();
        match err {
            BirdwatcherError::Command { message } => assert!(message.contains("unknown command")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timeout_kills_child() {
        let started = Instant::now();
        let err = run("exec sleep 30", "show session", 1).unwrap_err();
        assert!(matches!(err, BirdwatcherError::Timeout { seconds: 1 }));
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test]
    fn test_inherited_pipe_does_not_outlive_timeout() {
        let started = Instant::now();
        let err = run("sleep 30 & echo '[]'", "show session", 1).unwrap_err();
        assert!(matches!(err, BirdwatcherError::Timeout { seconds: 1 }));
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test]
    fn test_missing_binary() {
        let exec = ProcessExecutor::new("/nonexistent/dir/birdwatcher");
        let err = exec.execute("version", 5).unwrap_err();
        assert!(matches!(err, BirdwatcherError::BinaryMissing { .. }));
    }
}
