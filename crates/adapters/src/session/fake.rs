// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake session adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SessionAdapter, SessionError};
use crate::subprocess::ProcessError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Recorded session call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Create { handle: String, cwd: PathBuf },
    SendKey { handle: String, key: String },
    SendLiteral { handle: String, text: String },
    Capture { handle: String, lines: u32 },
    Exists { handle: String },
    Kill { handle: String },
}

/// Fake session state
#[derive(Debug, Clone)]
pub struct FakeSession {
    pub cwd: PathBuf,
    /// Screen lines; literal text sent to the session is echoed here
    pub output: Vec<String>,
    pub alive: bool,
}

#[derive(Default)]
struct FakeSessionState {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<SessionCall>,
    fail_create: bool,
    fail_sends: bool,
    fail_kill: bool,
    fail_capture: Vec<String>,
    capture_delay: Option<Duration>,
}

/// Fake session adapter for testing
#[derive(Clone, Default)]
pub struct FakeSessionAdapter {
    inner: Arc<Mutex<FakeSessionState>>,
}

fn failed(description: &str) -> SessionError {
    SessionError::Process(ProcessError::Failed {
        description: description.to_string(),
        status: Some(1),
        stderr: "injected failure".to_string(),
    })
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SessionCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Keys and literal text sent to `handle`, in order
    pub fn inputs(&self, handle: &str) -> Vec<SessionCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| match c {
                SessionCall::SendKey { handle: h, .. }
                | SessionCall::SendLiteral { handle: h, .. } => h == handle,
                _ => false,
            })
            .cloned()
            .collect()
    }

    pub fn get_session(&self, handle: &str) -> Option<FakeSession> {
        self.inner.lock().sessions.get(handle).cloned()
    }

    /// Replace the screen contents
    pub fn set_output(&self, handle: &str, output: &str) {
        if let Some(session) = self.inner.lock().sessions.get_mut(handle) {
            session.output = output.lines().map(String::from).collect();
        }
    }

    /// Mark the session's process as gone (has-session will fail)
    pub fn set_exited(&self, handle: &str) {
        if let Some(session) = self.inner.lock().sessions.get_mut(handle) {
            session.alive = false;
        }
    }

    /// Add a pre-existing session
    pub fn add_session(&self, handle: &str, alive: bool) {
        self.inner.lock().sessions.insert(
            handle.to_string(),
            FakeSession {
                cwd: PathBuf::new(),
                output: Vec::new(),
                alive,
            },
        );
    }

    pub fn fail_create(&self, fail: bool) {
        self.inner.lock().fail_create = fail;
    }

    /// Make send_key/send_literal fail for every session
    pub fn fail_sends(&self, fail: bool) {
        self.inner.lock().fail_sends = fail;
    }

    pub fn fail_kill(&self, fail: bool) {
        self.inner.lock().fail_kill = fail;
    }

    /// Make capture fail for `handle` while it still exists
    pub fn fail_capture(&self, handle: &str) {
        self.inner.lock().fail_capture.push(handle.to_string());
    }

    /// Delay every capture call (simulates a slow multiplexer)
    pub fn set_capture_delay(&self, delay: Duration) {
        self.inner.lock().capture_delay = Some(delay);
    }

    fn record(&self, call: SessionCall) {
        self.inner.lock().calls.push(call);
    }
}

#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn create(&self, handle: &str, cwd: &Path) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Create {
            handle: handle.to_string(),
            cwd: cwd.to_path_buf(),
        });
        if inner.fail_create {
            return Err(failed("tmux new-session"));
        }
        inner.sessions.insert(
            handle.to_string(),
            FakeSession {
                cwd: cwd.to_path_buf(),
                output: Vec::new(),
                alive: true,
            },
        );
        Ok(())
    }

    async fn send_key(&self, handle: &str, key: &str) -> Result<(), SessionError> {
        self.record(SessionCall::SendKey {
            handle: handle.to_string(),
            key: key.to_string(),
        });
        let inner = self.inner.lock();
        if inner.fail_sends {
            return Err(failed("tmux send-keys"));
        }
        match inner.sessions.get(handle) {
            Some(s) if s.alive => Ok(()),
            _ => Err(SessionError::NotFound(handle.to_string())),
        }
    }

    async fn send_literal(&self, handle: &str, text: &str) -> Result<(), SessionError> {
        self.record(SessionCall::SendLiteral {
            handle: handle.to_string(),
            text: text.to_string(),
        });
        let mut inner = self.inner.lock();
        if inner.fail_sends {
            return Err(failed("tmux send-keys literal"));
        }
        match inner.sessions.get_mut(handle) {
            Some(s) if s.alive => {
                s.output.push(text.to_string());
                Ok(())
            }
            _ => Err(SessionError::NotFound(handle.to_string())),
        }
    }

    async fn capture(&self, handle: &str, lines: u32) -> Result<String, SessionError> {
        self.record(SessionCall::Capture {
            handle: handle.to_string(),
            lines,
        });
        let delay = self.inner.lock().capture_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let inner = self.inner.lock();
        if inner.fail_capture.iter().any(|h| h == handle) {
            return Err(failed("tmux capture-pane"));
        }
        match inner.sessions.get(handle) {
            Some(s) if s.alive => {
                let start = s.output.len().saturating_sub(lines as usize);
                Ok(s.output[start..].join("\n"))
            }
            _ => Err(SessionError::NotFound(handle.to_string())),
        }
    }

    async fn exists(&self, handle: &str) -> Result<bool, SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Exists {
            handle: handle.to_string(),
        });
        Ok(inner.sessions.get(handle).map(|s| s.alive).unwrap_or(false))
    }

    async fn kill(&self, handle: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::Kill {
            handle: handle.to_string(),
        });
        if inner.fail_kill {
            return Err(failed("tmux kill-session"));
        }
        match inner.sessions.get_mut(handle) {
            Some(s) if s.alive => {
                s.alive = false;
                Ok(())
            }
            _ => Err(SessionError::NotFound(handle.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
