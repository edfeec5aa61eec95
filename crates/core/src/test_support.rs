// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Event, JobId, SessionId, SessionInfo};
use std::path::PathBuf;

// ── Event factory functions ─────────────────────────────────────────────────

pub fn created_event(id: &str) -> Event {
    Event::SessionCreated {
        session_id: SessionId::new(id),
        handle: SessionId::new(id).handle(),
        working_directory: PathBuf::from("/tmp/proj"),
    }
}

pub fn confirmation_event(id: &str, output: &str) -> Event {
    Event::ConfirmationRequired {
        session_id: SessionId::new(id),
        job_id: None,
        output: output.to_string(),
        timestamp_ms: 1_000_000,
    }
}

pub fn job_confirmation_event(id: &str, job: &str, output: &str) -> Event {
    Event::ConfirmationRequired {
        session_id: SessionId::new(id),
        job_id: Some(JobId::new(job)),
        output: output.to_string(),
        timestamp_ms: 1_000_000,
    }
}

pub fn ended_event(id: &str) -> Event {
    Event::SessionEnded {
        session_id: SessionId::new(id),
    }
}

pub fn error_event(id: &str, error: &str) -> Event {
    Event::SessionError {
        session_id: SessionId::new(id),
        error: error.to_string(),
    }
}

pub fn terminated_event(id: &str) -> Event {
    Event::SessionTerminated {
        session_id: SessionId::new(id),
    }
}

// ── Record factories ────────────────────────────────────────────────────────

pub fn session_info(id: &str) -> SessionInfo {
    let session_id = SessionId::new(id);
    SessionInfo {
        handle: session_id.handle(),
        session_id,
        working_directory: PathBuf::from("/tmp/proj"),
        resume_token: None,
        is_active: true,
        created_at_ms: 1_000_000,
        last_activity_ms: 1_000_000,
    }
}
