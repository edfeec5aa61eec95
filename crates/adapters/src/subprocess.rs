// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process Executor: the single choke point for external commands.
//!
//! Every multiplexer, git, and setup invocation goes through
//! [`run_with_timeout`] or [`execute`], so timeout and error wrapping live
//! in one place. One OS process is spawned per call; nothing is kept alive.

use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Default timeout for git worktree operations.
pub const GIT_WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for toolchain installation steps.
pub const SETUP_INSTALL_TIMEOUT: Duration = Duration::from_secs(900);

/// Default timeout for quick presence probes (`tmux -V`, `brew --version`).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Ceiling for each multiplexer invocation (`AH_EXEC_TIMEOUT_MS`, default 5 min).
pub fn multiplexer_timeout() -> Duration {
    crate::env::exec_timeout()
}

/// Errors from running an external command
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{description} failed to start: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        description: String,
        timeout: Duration,
    },
    #[error("{description} exited with {}: {stderr}", exit_label(.status))]
    Failed {
        description: String,
        status: Option<i32>,
        stderr: String,
    },
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`. A non-zero exit is
/// not an error here; callers that want that use [`execute`]. The child is
/// killed if the timeout elapses.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, ProcessError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ProcessError::Spawn {
            description: description.to_string(),
            source,
        }),
        Err(_elapsed) => Err(ProcessError::Timeout {
            description: description.to_string(),
            timeout,
        }),
    }
}

/// Run a command to completion and return its stdout.
///
/// Non-zero exit becomes [`ProcessError::Failed`] carrying stderr.
pub async fn execute(
    cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<String, ProcessError> {
    let output = run_with_timeout(cmd, timeout, description).await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ProcessError::Failed {
            description: description.to_string(),
            status: output.status.code(),
            stderr,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
