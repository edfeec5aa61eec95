// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record store for job transcripts and confirmation records

mod jsonl;

pub use jsonl::JsonlRecordStore;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRecordStore;

use ah_core::{ConfirmationStatus, JobId, MessageRole};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from record store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One persisted transcript line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptRecord {
    Message {
        role: MessageRole,
        content: String,
        timestamp_ms: u64,
    },
    Confirmation {
        message: String,
        status: ConfirmationStatus,
        timestamp_ms: u64,
    },
}

/// Append-only sink for job transcripts.
///
/// Callers treat failures as loggable, never fatal.
#[async_trait]
pub trait RecordStore: Clone + Send + Sync + 'static {
    async fn append_message(
        &self,
        job_id: &JobId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), StoreError>;

    /// Record that the agent asked for confirmation (status `PENDING`)
    async fn append_confirmation(&self, job_id: &JobId, message: &str) -> Result<(), StoreError>;
}
