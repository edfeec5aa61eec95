// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake record store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{RecordStore, StoreError, TranscriptRecord};
use ah_core::{ConfirmationStatus, JobId, MessageRole};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct FakeRecordState {
    records: Vec<(JobId, TranscriptRecord)>,
    fail: bool,
}

/// In-memory record store; timestamps are always 0
#[derive(Clone, Default)]
pub struct FakeRecordStore {
    inner: Arc<Mutex<FakeRecordState>>,
}

impl FakeRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every append fails with an io error
    pub fn set_failing(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }

    pub fn records(&self, job_id: &JobId) -> Vec<TranscriptRecord> {
        self.inner
            .lock()
            .records
            .iter()
            .filter(|(j, _)| j == job_id)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Message contents for `role`, in order
    pub fn messages(&self, job_id: &JobId, role: MessageRole) -> Vec<String> {
        self.records(job_id)
            .into_iter()
            .filter_map(|r| match r {
                TranscriptRecord::Message {
                    role: r, content, ..
                } if r == role => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn confirmations(&self, job_id: &JobId) -> Vec<String> {
        self.records(job_id)
            .into_iter()
            .filter_map(|r| match r {
                TranscriptRecord::Confirmation { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, job_id: &JobId, record: TranscriptRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.fail {
            return Err(StoreError::Io(std::io::Error::other("injected failure")));
        }
        inner.records.push((job_id.clone(), record));
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn append_message(
        &self,
        job_id: &JobId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), StoreError> {
        self.push(
            job_id,
            TranscriptRecord::Message {
                role,
                content: content.to_string(),
                timestamp_ms: 0,
            },
        )
    }

    async fn append_confirmation(&self, job_id: &JobId, message: &str) -> Result<(), StoreError> {
        self.push(
            job_id,
            TranscriptRecord::Confirmation {
                message: message.to_string(),
                status: ConfirmationStatus::Pending,
                timestamp_ms: 0,
            },
        )
    }
}
