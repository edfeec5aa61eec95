// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-lines transcript store: one `<job_id>.jsonl` file per job

use super::{RecordStore, StoreError, TranscriptRecord};
use ah_core::{epoch_ms, ConfirmationStatus, JobId, MessageRole};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct JsonlRecordStore {
    dir: PathBuf,
}

impl JsonlRecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `job_id`. Bytes outside `[A-Za-z0-9_-]` are written as
    /// `%XX`, so distinct ids never share a file.
    pub fn path_for(&self, job_id: &JobId) -> PathBuf {
        let mut name = String::with_capacity(job_id.as_str().len());
        for byte in job_id.as_str().bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("%{:02X}", byte));
            }
        }
        self.dir.join(format!("{}.jsonl", name))
    }

    /// Read back every record for a job. A job with no file has no records.
    pub async fn read(&self, job_id: &JobId) -> Result<Vec<TranscriptRecord>, StoreError> {
        let text = match tokio::fs::read_to_string(self.path_for(job_id)).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(StoreError::from))
            .collect()
    }

    async fn append(&self, job_id: &JobId, record: &TranscriptRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(job_id))
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonlRecordStore {
    async fn append_message(
        &self,
        job_id: &JobId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), StoreError> {
        let record = TranscriptRecord::Message {
            role,
            content: content.to_string(),
            timestamp_ms: epoch_ms(),
        };
        self.append(job_id, &record).await
    }

    async fn append_confirmation(&self, job_id: &JobId, message: &str) -> Result<(), StoreError> {
        let record = TranscriptRecord::Confirmation {
            message: message.to_string(),
            status: ConfirmationStatus::Pending,
            timestamp_ms: epoch_ms(),
        };
        self.append(job_id, &record).await
    }
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
