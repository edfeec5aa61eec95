// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake worktree provisioner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Worktree, WorktreeAdapter, WorktreeError};
use ah_core::SessionId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Default)]
struct FakeWorktreeState {
    created: Vec<SessionId>,
    removed: Vec<SessionId>,
    fail: bool,
}

/// Creates plain directories under `base`; no git involved
#[derive(Clone)]
pub struct FakeWorktreeAdapter {
    base: PathBuf,
    inner: Arc<Mutex<FakeWorktreeState>>,
}

impl FakeWorktreeAdapter {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            inner: Arc::new(Mutex::new(FakeWorktreeState::default())),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }

    pub fn created(&self) -> Vec<SessionId> {
        self.inner.lock().created.clone()
    }

    pub fn removed(&self) -> Vec<SessionId> {
        self.inner.lock().removed.clone()
    }
}

#[async_trait]
impl WorktreeAdapter for FakeWorktreeAdapter {
    async fn create(&self, session_id: &SessionId) -> Result<Worktree, WorktreeError> {
        if self.inner.lock().fail {
            return Err(WorktreeError::NoCommits);
        }
        let path = self.base.join(session_id.as_str());
        std::fs::create_dir_all(&path)?;
        self.inner.lock().created.push(session_id.clone());
        Ok(Worktree {
            branch: format!("agent/{}", session_id),
            path,
        })
    }

    async fn remove(&self, session_id: &SessionId) -> Result<(), WorktreeError> {
        let path = self.base.join(session_id.as_str());
        if path.exists() {
            std::fs::remove_dir_all(&path)?;
        }
        self.inner.lock().removed.push(session_id.clone());
        Ok(())
    }
}
