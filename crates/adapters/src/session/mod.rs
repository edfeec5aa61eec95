// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal multiplexer adapters

mod tmux;

pub use tmux::TmuxAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSession, FakeSessionAdapter, SessionCall};

use crate::subprocess::ProcessError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Named keys understood by the multiplexer's send-keys.
pub mod keys {
    /// Clear the partially typed input line
    pub const CLEAR_LINE: &str = "C-u";
    /// Interrupt whatever the agent is doing
    pub const CANCEL: &str = "C-c";
    pub const SUBMIT: &str = "Enter";
    /// Shift+Tab; the agent rotates its operating mode on it
    pub const CYCLE_MODE: &str = "BTab";
}

/// Errors from multiplexer operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("multiplexer session not found: {0}")]
    NotFound(String),
    #[error("working directory does not exist: {}", .0.display())]
    InvalidDirectory(PathBuf),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Adapter for a terminal multiplexer (tmux, etc.)
///
/// Sessions are addressed by their handle (`codeagent-<id>`); the adapter
/// never sees logical ids.
#[async_trait]
pub trait SessionAdapter: Clone + Send + Sync + 'static {
    /// Create a detached session whose shell starts in `cwd`
    async fn create(&self, handle: &str, cwd: &Path) -> Result<(), SessionError>;

    /// Send one named key (see [`keys`])
    async fn send_key(&self, handle: &str, key: &str) -> Result<(), SessionError>;

    /// Type literal text (no key name interpretation)
    async fn send_literal(&self, handle: &str, text: &str) -> Result<(), SessionError>;

    /// Capture the last `lines` lines of the rendered pane
    async fn capture(&self, handle: &str, lines: u32) -> Result<String, SessionError>;

    /// Whether the session still exists
    async fn exists(&self, handle: &str) -> Result<bool, SessionError>;

    async fn kill(&self, handle: &str) -> Result<(), SessionError>;
}
