//! Subprocess execution with captured output and a timeout.
//!
//! [`run_command`] spawns an executable, drains stdout and stderr on
//! separate tasks so a chatty child can never block on a full pipe, and
//! kills the child if it outlives the timeout.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::error::ToolError;

/// Maximum stdout captured (decoded PCM can be large).
const MAX_STDOUT_BYTES: usize = 256 * 1024 * 1024;

/// Maximum stderr captured; diagnostics beyond this are dropped.
const MAX_STDERR_BYTES: usize = 1024 * 1024;

/// Captured output of a successful run.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub duration_ms: u64,
}

/// Run `program` with `args` to completion.
///
/// A non-zero exit yields [`ToolError::ExecutionFailed`] carrying the
/// trimmed stderr text; exceeding `timeout` kills the child and yields
/// [`ToolError::Timeout`]. Stdout beyond the capture limit yields
/// [`ToolError::OutputTooLarge`].
pub async fn run_command<S: AsRef<str>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> Result<ProcessOutput, ToolError> {
    run_with_limit(program, args, timeout, MAX_STDOUT_BYTES).await
}

async fn run_with_limit<S: AsRef<str>>(
    program: &str,
    args: &[S],
    timeout: Duration,
    max_stdout: usize,
) -> Result<ProcessOutput, ToolError> {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|a| a.as_ref()))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();
    tracing::debug!(program, args = args.len(), "Spawning external process");

    let mut child = cmd.spawn().map_err(|source| ToolError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();
    // One byte past the limit tells a full read apart from a truncated one.
    let stdout_task = tokio::spawn(read_stream(stdout_handle, max_stdout + 1));
    let stderr_task = tokio::spawn(read_stream(stderr_handle, MAX_STDERR_BYTES));

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => return Err(ToolError::Io(e)),
        Err(_elapsed) => {
            // `child` is dropped on return, which kills it (`kill_on_drop`).
            let elapsed_ms = start.elapsed().as_millis() as u64;
            tracing::warn!(program, elapsed_ms, "External process timed out");
            return Err(ToolError::Timeout {
                program: program.to_string(),
                elapsed_ms,
            });
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr_bytes = stderr_task.await.unwrap_or_default();
    let stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_string();
    let duration_ms = start.elapsed().as_millis() as u64;

    // Checked before the exit status: a reader that stops early usually
    // kills the child with SIGPIPE.
    if stdout.len() > max_stdout {
        tracing::warn!(program, limit = max_stdout, "External process output truncated");
        return Err(ToolError::OutputTooLarge {
            program: program.to_string(),
            limit: max_stdout,
        });
    }

    if !status.success() {
        return Err(ToolError::ExecutionFailed {
            program: program.to_string(),
            exit_code: status.code(),
            stderr: if stderr.is_empty() {
                "Command failed".to_string()
            } else {
                stderr
            },
        });
    }

    tracing::debug!(program, duration_ms, "External process finished");
    Ok(ProcessOutput {
        stdout,
        stderr,
        duration_ms,
    })
}

async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>, limit: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h).take(limit as u64).read_to_end(&mut buf).await;
    }
    buf
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SECOND: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn captures_stdout() {
        let out = run_command("sh", &["-c", "printf hello"], SECOND).await.unwrap();
        assert_eq!(out.stdout, b"hello");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let err = run_command("sh", &["-c", "echo 'bad input' >&2; exit 3"], SECOND)
            .await
            .unwrap_err();
        assert_matches!(
            err,
            ToolError::ExecutionFailed { exit_code: Some(3), ref stderr, .. } if stderr == "bad input"
        );
    }

    #[tokio::test]
    async fn silent_failure_gets_generic_message() {
        let err = run_command("sh", &["-c", "exit 1"], SECOND).await.unwrap_err();
        assert!(err.to_string().contains("Command failed"));
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let err = run_command::<&str>("/nonexistent/tool-xyz", &[], SECOND)
            .await
            .unwrap_err();
        assert_matches!(err, ToolError::Spawn { .. });
    }

    #[tokio::test]
    async fn oversized_stdout_is_reported() {
        let err = run_with_limit("sh", &["-c", "head -c 100000 /dev/zero"], SECOND, 1024)
            .await
            .unwrap_err();
        assert_matches!(err, ToolError::OutputTooLarge { limit: 1024, .. });
    }

    #[tokio::test]
    async fn output_at_the_limit_is_kept() {
        let out = run_with_limit("sh", &["-c", "head -c 1024 /dev/zero"], SECOND, 1024)
            .await
            .unwrap();
        assert_eq!(out.stdout.len(), 1024);
    }

    #[tokio::test]
    async fn slow_process_times_out() {
        let err = run_command("sleep", &["5"], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_matches!(err, ToolError::Timeout { .. });
    }
}
