// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree provisioning: one isolated checkout per agent session

mod git;

pub use git::GitWorktreeAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWorktreeAdapter;

use crate::subprocess::ProcessError;
use ah_core::SessionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from worktree operations
#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("project root does not exist: {}", .0.display())]
    MissingProject(PathBuf),
    #[error("repository has no commits after initialization")]
    NoCommits,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// A provisioned checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worktree {
    pub branch: String,
    pub path: PathBuf,
}

#[async_trait]
pub trait WorktreeAdapter: Clone + Send + Sync + 'static {
    /// Provision a fresh checkout for `session_id`
    async fn create(&self, session_id: &SessionId) -> Result<Worktree, WorktreeError>;

    /// Remove the checkout and its branch (missing ones are not an error)
    async fn remove(&self, session_id: &SessionId) -> Result<(), WorktreeError>;
}
