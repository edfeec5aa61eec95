// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::session::{SessionAdapter, SessionError};
use async_trait::async_trait;
use std::path::Path;
use tracing::Instrument;

/// Wrapper that adds tracing to any SessionAdapter
#[derive(Clone)]
pub struct TracedSession<S> {
    inner: S,
}

impl<S> TracedSession<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: SessionAdapter> SessionAdapter for TracedSession<S> {
    async fn create(&self, handle: &str, cwd: &Path) -> Result<(), SessionError> {
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.create(handle, cwd).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "session created"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create failed"),
            }
            result
        }
        .instrument(tracing::info_span!("session.create", handle, cwd = %cwd.display()))
        .await
    }

    async fn send_key(&self, handle: &str, key: &str) -> Result<(), SessionError> {
        let result = self.inner.send_key(handle, key).await;
        if let Err(ref e) = result {
            tracing::error!(handle, key, error = %e, "send_key failed");
        }
        result
    }

    async fn send_literal(&self, handle: &str, text: &str) -> Result<(), SessionError> {
        tracing::info_span!("session.send", handle)
            .in_scope(|| tracing::debug!(input_len = text.len(), "sending"));
        let result = self.inner.send_literal(handle, text).await;
        if let Err(ref e) = result {
            tracing::error!(handle, error = %e, "send failed");
        }
        result
    }

    async fn capture(&self, handle: &str, lines: u32) -> Result<String, SessionError> {
        let result = self.inner.capture(handle, lines).await;
        tracing::info_span!("session.capture", handle, lines).in_scope(|| match &result {
            Ok(text) => tracing::trace!(captured_len = text.len(), "captured"),
            Err(e) => tracing::warn!(error = %e, "capture failed"),
        });
        result
    }

    async fn exists(&self, handle: &str) -> Result<bool, SessionError> {
        let result = self.inner.exists(handle).await;
        tracing::trace!(handle, exists = ?result.as_ref().ok(), "checked");
        result
    }

    async fn kill(&self, handle: &str) -> Result<(), SessionError> {
        let result = self.inner.kill(handle).await;
        tracing::info_span!("session.kill", handle).in_scope(|| match &result {
            Ok(()) => tracing::info!("killed"),
            Err(e) => tracing::warn!(error = %e, "kill failed (may be expected)"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
