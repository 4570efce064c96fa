//! External process execution.
//!
//! ## Why a trait?
//!
//! Everything above this layer only cares that a [`ToolCommand`] ran and what
//! it printed. Putting the spawn behind [`CommandRunner`] lets callers inject
//! their own runner (sandboxing, remote execution, or a scripted fake in
//! tests) through [`crate::PdfImageOptions::runner`].
//!
//! [`SystemRunner`] spawns children with `kill_on_drop`, so when a fan-out is
//! abandoned after the first failure, the dropped futures take their
//! processes down with them instead of leaving orphans behind.

use crate::error::{ExitInfo, ProcessError};
use crate::pipeline::command::ToolCommand;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tracing::debug;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs one external command to completion.
///
/// A nonzero exit must come back as `Err(ProcessError)`, never as a panic.
/// Implementations spawn at most one process per call and never retry.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand) -> Result<ProcessOutput, ProcessError>;
}

/// Runs commands as real child processes via `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// `timeout` bounds each process's wall-clock time; `None` waits forever.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ProcessOutput, ProcessError> {
        let line = command.to_string();
        debug!("Running: {}", line);

        let mut child = tokio::process::Command::new(command.program());
        child
            .args(command.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let spawned = child.output();
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, spawned).await {
                Ok(r) => r,
                Err(_) => {
                    return Err(ProcessError {
                        command: line,
                        exit: ExitInfo::TimedOut {
                            secs: limit.as_secs(),
                        },
                        stdout: String::new(),
                        stderr: String::new(),
                    });
                }
            },
            None => spawned.await,
        };

        let output = result.map_err(|e| ProcessError {
            command: line.clone(),
            exit: ExitInfo::SpawnFailed(e.to_string()),
            stdout: String::new(),
            stderr: String::new(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(ProcessOutput { stdout, stderr })
        } else {
            let exit = match output.status.code() {
                Some(code) => ExitInfo::Exited(code),
                None => ExitInfo::Terminated,
            };
            debug!("Command failed ({}): {}", exit, line);
            Err(ProcessError {
                command: line,
                exit,
                stdout,
                stderr,
            })
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let cmd = ToolCommand::new("sh").token("-c").token("printf 'Pages: 2\\n'");
        let out = SystemRunner::default().run(&cmd).await.unwrap();
        assert_eq!(out.stdout, "Pages: 2\n");
    }

    #[tokio::test]
    async fn nonzero_exit_is_an_error_value() {
        let cmd = ToolCommand::new("sh").token("-c").token("echo oops >&2; exit 3");
        let err = SystemRunner::default().run(&cmd).await.unwrap_err();
        assert_eq!(err.exit, ExitInfo::Exited(3));
        assert_eq!(err.stderr.trim(), "oops");
        assert!(err.command.starts_with("sh -c"));
    }

    #[tokio::test]
    async fn error_carries_quoted_command_line() {
        let cmd = ToolCommand::new("sh")
            .token("-c")
            .token("exit 1")
            .path("/tmp/with space.pdf");
        let err = SystemRunner::default().run(&cmd).await.unwrap_err();
        assert_eq!(err.command, "sh -c exit 1 \"/tmp/with space.pdf\"");
        assert_eq!(err.exit, ExitInfo::Exited(1));
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_failure() {
        let cmd = ToolCommand::new("definitely-not-a-real-binary-pdf2img");
        let err = SystemRunner::default().run(&cmd).await.unwrap_err();
        assert!(matches!(err.exit, ExitInfo::SpawnFailed(_)));
    }

    #[tokio::test]
    async fn timeout_kills_slow_process() {
        let cmd = ToolCommand::new("sleep").token("5");
        let runner = SystemRunner::new(Some(Duration::from_millis(100)));
        let err = runner.run(&cmd).await.unwrap_err();
        assert!(matches!(err.exit, ExitInfo::TimedOut { .. }));
    }
}
