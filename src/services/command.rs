//! External command execution
//!
//! All interaction with the cluster manager happens through shell commands
//! (`crm_mon`, `pcs`, a switchover wrapper). The [`CommandRunner`] trait is
//! the seam that lets the decision engine run against scripted output in
//! tests; [`SystemCommandRunner`] is the real implementation.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::utils::{FailoverError, FailoverResult};

/// Captured output of a completed external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Executes external commands on behalf of the engine.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a shell command to completion and capture its output. A missing
    /// binary, a nonzero exit, or a hang past the timeout is an
    /// [`FailoverError::ExternalTool`] error.
    async fn run(&self, command: &str) -> FailoverResult<CommandOutput>;
}

/// Runs commands through `bash -c` with a bounded execution time.
pub struct SystemCommandRunner {
    command_timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, command: &str) -> FailoverResult<CommandOutput> {
        let program = command.split_whitespace().next().ok_or_else(|| {
            FailoverError::ExternalTool {
                command: command.to_string(),
                reason: "empty command".to_string(),
            }
        })?;

        if !in_path(program) {
            return Err(FailoverError::ExternalTool {
                command: command.to_string(),
                reason: format!("{program} was not found in $PATH"),
            });
        }

        debug!(command, "executing external command");

        let result = timeout(
            self.command_timeout,
            Command::new("bash")
                .arg("-c")
                .arg(command)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(FailoverError::ExternalTool {
                    command: command.to_string(),
                    reason: format!("failed to spawn: {e}"),
                })
            }
            Err(_) => {
                error!(command, timeout_secs = self.command_timeout.as_secs(), "external command timed out");
                return Err(FailoverError::ExternalTool {
                    command: command.to_string(),
                    reason: format!(
                        "produced no result within {} seconds",
                        self.command_timeout.as_secs()
                    ),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(FailoverError::ExternalTool {
                command: command.to_string(),
                reason: format!(
                    "exited with status {}: {}",
                    output
                        .status
                        .code()
                        .map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                    stderr.trim()
                ),
            });
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code: output.status.code(),
        })
    }
}

/// Check whether a program is resolvable, either as an explicit path or
/// through `$PATH`.
fn in_path(program: &str) -> bool {
    if program.contains('/') {
        return Path::new(program).exists();
    }

    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> SystemCommandRunner {
        SystemCommandRunner::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let output = runner().run("echo hello").await.expect("echo succeeds");
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_pipelines_are_supported() {
        let output = runner()
            .run("printf 'a\\nb\\n' | wc -l")
            .await
            .expect("pipeline succeeds");
        assert_eq!(output.stdout.trim(), "2");
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let err = runner()
            .run("definitely-not-a-real-binary --flag")
            .await
            .expect_err("missing binary must fail");
        match err {
            FailoverError::ExternalTool { reason, .. } => {
                assert!(reason.contains("not found in $PATH"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported() {
        let err = runner().run("false").await.expect_err("false exits 1");
        match err {
            FailoverError::ExternalTool { reason, .. } => {
                assert!(reason.contains("exited with status 1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_hung_command_times_out() {
        let runner = SystemCommandRunner::new(Duration::from_millis(100));
        let err = runner.run("sleep 5").await.expect_err("must time out");
        match err {
            FailoverError::ExternalTool { reason, .. } => {
                assert!(reason.contains("no result within"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
