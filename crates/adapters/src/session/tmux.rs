// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux session adapter

use super::{SessionAdapter, SessionError};
use crate::subprocess::{execute, multiplexer_timeout, run_with_timeout};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Tmux-based session adapter
#[derive(Clone, Default)]
pub struct TmuxAdapter;

impl TmuxAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionAdapter for TmuxAdapter {
    async fn create(&self, handle: &str, cwd: &Path) -> Result<(), SessionError> {
        // Precondition: cwd must exist
        if !cwd.is_dir() {
            return Err(SessionError::InvalidDirectory(cwd.to_path_buf()));
        }

        let mut cmd = Command::new("tmux");
        cmd.args(["new-session", "-d", "-s", handle, "-c"]).arg(cwd);
        if let Err(e) = execute(cmd, multiplexer_timeout(), "tmux new-session").await {
            tracing::error!(handle, error = %e, "tmux new-session failed");
            return Err(e.into());
        }
        Ok(())
    }

    async fn send_key(&self, handle: &str, key: &str) -> Result<(), SessionError> {
        tmux(
            &["send-keys", "-t", pane_target(handle).as_str(), key],
            "tmux send-keys",
        )
        .await?;
        Ok(())
    }

    async fn send_literal(&self, handle: &str, text: &str) -> Result<(), SessionError> {
        // -l = literal mode (no key name interpretation)
        // -- = end of options (handles text starting with -)
        tmux(
            &["send-keys", "-t", pane_target(handle).as_str(), "-l", "--", text],
            "tmux send-keys literal",
        )
        .await?;
        Ok(())
    }

    async fn capture(&self, handle: &str, lines: u32) -> Result<String, SessionError> {
        let start = format!("-{}", lines);
        tmux(
            &[
                "capture-pane",
                "-t",
                pane_target(handle).as_str(),
                "-p",
                "-S",
                &start,
            ],
            "tmux capture-pane",
        )
        .await
    }

    async fn exists(&self, handle: &str) -> Result<bool, SessionError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["has-session", "-t", session_target(handle).as_str()]);
        let output = run_with_timeout(cmd, multiplexer_timeout(), "tmux has-session").await?;
        Ok(output.status.success())
    }

    async fn kill(&self, handle: &str) -> Result<(), SessionError> {
        tmux(
            &["kill-session", "-t", session_target(handle).as_str()],
            "tmux kill-session",
        )
        .await?;
        Ok(())
    }
}

/// Exact-match session target. A bare name also matches any session whose
/// name starts with it, so `codeagent-x-1` would hit `codeagent-x-10`.
fn session_target(handle: &str) -> String {
    format!("={}", handle)
}

/// Active pane of the exactly named session
fn pane_target(handle: &str) -> String {
    format!("={}:", handle)
}

async fn tmux(args: &[&str], description: &str) -> Result<String, SessionError> {
    let mut cmd = Command::new("tmux");
    cmd.args(args);
    Ok(execute(cmd, multiplexer_timeout(), description).await?)
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
