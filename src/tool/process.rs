//! Subprocess execution shared by the shell and python_repl tools

use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::error::{AgentError, Result};

/// Default timeout in milliseconds (2 minutes)
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Maximum timeout in milliseconds (10 minutes)
pub const MAX_TIMEOUT_MS: u64 = 600_000;

/// Maximum output length before truncation
pub const MAX_OUTPUT_LENGTH: usize = 30_000;

/// How long output is still read after the process exits
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Captured result of a finished process
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessOutput {
    /// Combine stdout and stderr into the text shown to the model
    pub fn render(&self) -> String {
        let mut output = String::new();

        if !self.stdout.is_empty() {
            output.push_str(&self.stdout);
        }

        if !self.stderr.is_empty() {
            if !output.is_empty() {
                output.push_str("\n--- stderr ---\n");
            }
            output.push_str(&self.stderr);
        }

        if output.len() > MAX_OUTPUT_LENGTH {
            let mut cut = MAX_OUTPUT_LENGTH;
            while !output.is_char_boundary(cut) {
                cut -= 1;
            }
            output.truncate(cut);
            output.push_str("\n... (output truncated)");
        }

        if self.exit_code != 0 {
            output.push_str(&format!("\n(exit code: {})", self.exit_code));
        }

        output
    }
}

/// Clamp a requested timeout to the allowed range
pub fn timeout_for(requested: Option<u64>) -> Duration {
    Duration::from_millis(requested.unwrap_or(DEFAULT_TIMEOUT_MS).min(MAX_TIMEOUT_MS))
}

/// Read a pipe to the end, keeping every chunk already read if the future is dropped
async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>, sink: &mut Vec<u8>) -> std::io::Result<()> {
    let Some(mut pipe) = pipe else {
        return Ok(());
    };
    let mut chunk = [0u8; 8192];
    loop {
        let n = pipe.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        sink.extend_from_slice(&chunk[..n]);
    }
}

/// Run `program args...` in `working_dir`, killing it when the timeout expires
pub async fn run(
    tool: &str,
    program: &Path,
    args: &[&str],
    working_dir: &Path,
    limit: Duration,
) -> Result<ProcessOutput> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| AgentError::tool_execution(tool, format!("Failed to start {}: {e}", program.display())))?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let outcome = {
        let reads = async {
            let (out_res, err_res) =
                tokio::join!(drain(stdout_pipe, &mut stdout), drain(stderr_pipe, &mut stderr));
            out_res.and(err_res)
        };
        tokio::pin!(reads);

        let finish = async {
            // Pipes are read while waiting so a chatty child never blocks on a full pipe
            let exited = tokio::select! {
                status = child.wait() => Some(status?),
                res = &mut reads => {
                    res?;
                    None
                }
            };
            let status = match exited {
                Some(status) => {
                    // A background process started by the command may still hold the pipes
                    match timeout(DRAIN_GRACE, &mut reads).await {
                        Ok(res) => res?,
                        Err(_) => debug!(tool, "Output pipes still open after exit"),
                    }
                    status
                }
                None => child.wait().await?,
            };
            Ok::<_, std::io::Error>(status)
        };

        timeout(limit, finish).await
    };

    match outcome {
        Ok(Ok(status)) => Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.code().unwrap_or(-1),
        }),
        Ok(Err(e)) => Err(AgentError::tool_execution(tool, e.to_string())),
        Err(_) => Err(AgentError::tool_execution(
            tool,
            format!("Command timed out after {}ms", limit.as_millis()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_combines_streams() {
        let output = ProcessOutput {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
            exit_code: 2,
        };
        assert_eq!(output.render(), "out\n--- stderr ---\nerr\n(exit code: 2)");
    }

    #[test]
    fn test_render_truncates() {
        let output = ProcessOutput {
            stdout: "x".repeat(MAX_OUTPUT_LENGTH + 10),
            stderr: String::new(),
            exit_code: 0,
        };
        let rendered = output.render();
        assert!(rendered.ends_with("(output truncated)"));
        assert!(rendered.len() < MAX_OUTPUT_LENGTH + 100);
    }

    #[tokio::test]
    async fn test_exit_does_not_wait_for_background_children() {
        let temp = tempfile::TempDir::new().unwrap();
        let started = std::time::Instant::now();

        let output = run(
            "shell",
            Path::new("bash"),
            &["-c", "sleep 3 & echo started"],
            temp.path(),
            Duration::from_secs(10),
        )
        .await
        .unwrap();

        assert_eq!(output.stdout.trim(), "started");
        assert_eq!(output.exit_code, 0);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_large_output_is_read_while_waiting() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = run(
            "shell",
            Path::new("bash"),
            &["-c", "head -c 200000 /dev/zero | tr '\\0' a"],
            temp.path(),
            Duration::from_secs(10),
        )
        .await
        .unwrap();
        assert_eq!(output.stdout.len(), 200_000);
    }

    #[test]
    fn test_timeout_clamped() {
        assert_eq!(timeout_for(None), Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(
            timeout_for(Some(10 * MAX_TIMEOUT_MS)),
            Duration::from_millis(MAX_TIMEOUT_MS)
        );
    }
}
