// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git worktree provisioner.
//!
//! Checkouts live under `<project>/.agenthub/_wt/<session_id>` on branch
//! `agent/<session_id>`. A project that is not yet a repository gets
//! `git init` plus an initial commit first.

use super::{Worktree, WorktreeAdapter, WorktreeError};
use crate::subprocess::{execute, run_with_timeout, GIT_WORKTREE_TIMEOUT};
use ah_core::SessionId;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const GITIGNORE: &str = "# agenthub\n.agenthub/\nnode_modules/\n.DS_Store\n*.log\ndist/\nbuild/\n";

#[derive(Debug, Clone)]
pub struct GitWorktreeAdapter {
    project_root: PathBuf,
}

impl GitWorktreeAdapter {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn worktree_base(&self) -> PathBuf {
        self.project_root.join(".agenthub").join("_wt")
    }

    pub fn branch_for(session_id: &SessionId) -> String {
        format!("agent/{}", session_id)
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.project_root);
        cmd
    }

    async fn probe(&self, args: &[&str]) -> bool {
        let mut cmd = self.git();
        cmd.args(args);
        run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git rev-parse")
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn is_repository(&self) -> bool {
        self.probe(&["rev-parse", "--git-dir"]).await
    }

    async fn has_commits(&self) -> bool {
        self.probe(&["rev-parse", "--verify", "--quiet", "HEAD"]).await
    }

    async fn run(&self, args: &[&str], description: &str) -> Result<String, WorktreeError> {
        let mut cmd = self.git();
        cmd.args(args);
        Ok(execute(cmd, GIT_WORKTREE_TIMEOUT, description).await?)
    }

    async fn init_repository(&self) -> Result<(), WorktreeError> {
        tracing::info!(project = %self.project_root.display(), "initializing git repository");
        self.run(&["init"], "git init").await?;

        if self.has_commits().await {
            return Ok(());
        }
        let gitignore = self.project_root.join(".gitignore");
        if !gitignore.exists() {
            tokio::fs::write(&gitignore, GITIGNORE).await?;
        }
        self.run(&["add", "."], "git add").await?;
        self.run(
            &[
                "-c",
                "user.name=agenthub",
                "-c",
                "user.email=agenthub@localhost",
                "commit",
                "--allow-empty",
                "-m",
                "Initial commit - agenthub setup",
            ],
            "git commit",
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl WorktreeAdapter for GitWorktreeAdapter {
    async fn create(&self, session_id: &SessionId) -> Result<Worktree, WorktreeError> {
        if !self.project_root.is_dir() {
            return Err(WorktreeError::MissingProject(self.project_root.clone()));
        }
        if !self.is_repository().await {
            self.init_repository().await?;
        }
        if !self.has_commits().await {
            return Err(WorktreeError::NoCommits);
        }

        let branch = Self::branch_for(session_id);
        let base = self.worktree_base();
        let path = base.join(session_id.as_str());
        tokio::fs::create_dir_all(&base).await?;

        let path_arg = path_str(&path);
        self.run(
            &["worktree", "add", "-b", &branch, &path_arg, "HEAD"],
            "git worktree add",
        )
        .await?;
        tracing::info!(%session_id, branch, path = %path.display(), "worktree created");
        Ok(Worktree { branch, path })
    }

    async fn remove(&self, session_id: &SessionId) -> Result<(), WorktreeError> {
        let path = self.worktree_base().join(session_id.as_str());
        let path_arg = path_str(&path);
        if path.exists() {
            self.run(
                &["worktree", "remove", "--force", &path_arg],
                "git worktree remove",
            )
            .await?;
        }
        let branch = Self::branch_for(session_id);
        if let Err(e) = self.run(&["branch", "-D", &branch], "git branch -D").await {
            tracing::debug!(branch, error = %e, "branch delete skipped");
        }
        Ok(())
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
