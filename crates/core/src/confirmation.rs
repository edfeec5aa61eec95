// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending confirmation record.

use crate::job::{ConfirmationStatus, JobId};
use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// A confirmation the agent is waiting on.
///
/// Only ever tracked while pending: resolving a confirmation deletes the
/// record rather than transitioning its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    /// Captured terminal text that matched a confirmation pattern
    pub output: String,
    pub timestamp_ms: u64,
    pub status: ConfirmationStatus,
}

impl PendingConfirmation {
    pub fn new(
        session_id: SessionId,
        job_id: Option<JobId>,
        output: impl Into<String>,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            session_id,
            job_id,
            output: output.into(),
            timestamp_ms,
            status: ConfirmationStatus::Pending,
        }
    }
}
