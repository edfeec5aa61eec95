// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events published by the session orchestration layer.

use crate::job::JobId;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle and confirmation events.
///
/// Serializes with `{"type": "scope:name", ...fields}` format, which is also
/// the shape pushed to boundary subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- session --
    #[serde(rename = "session:created")]
    SessionCreated {
        session_id: SessionId,
        handle: String,
        working_directory: PathBuf,
    },

    #[serde(rename = "session:command_sent")]
    CommandSent {
        session_id: SessionId,
        command: String,
    },

    #[serde(rename = "session:mode_changed")]
    ModeChanged { session_id: SessionId },

    /// Agent is waiting on a yes/no answer.
    ///
    /// `job_id` is filled in by the facade; the lifecycle layer never knows it.
    #[serde(rename = "session:confirmation_required")]
    ConfirmationRequired {
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<JobId>,
        output: String,
        timestamp_ms: u64,
    },

    #[serde(rename = "session:confirmation_responded")]
    ConfirmationResponded {
        session_id: SessionId,
        approved: bool,
    },

    /// Facade-level: a tracked pending confirmation was answered and dropped
    #[serde(rename = "session:confirmation_resolved")]
    ConfirmationResolved {
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<JobId>,
        approved: bool,
    },

    #[serde(rename = "session:prompt_sent")]
    PromptSent {
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<JobId>,
        prompt: String,
    },

    /// Underlying multiplexer session disappeared
    #[serde(rename = "session:ended")]
    SessionEnded { session_id: SessionId },

    /// Monitor tick failed; the session has been force-deactivated
    #[serde(rename = "session:error")]
    SessionError { session_id: SessionId, error: String },

    #[serde(rename = "session:terminated")]
    SessionTerminated { session_id: SessionId },

    // -- system --
    #[serde(rename = "system:cleanup_complete")]
    CleanupComplete,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SessionCreated { .. } => "session:created",
            Event::CommandSent { .. } => "session:command_sent",
            Event::ModeChanged { .. } => "session:mode_changed",
            Event::ConfirmationRequired { .. } => "session:confirmation_required",
            Event::ConfirmationResponded { .. } => "session:confirmation_responded",
            Event::ConfirmationResolved { .. } => "session:confirmation_resolved",
            Event::PromptSent { .. } => "session:prompt_sent",
            Event::SessionEnded { .. } => "session:ended",
            Event::SessionError { .. } => "session:error",
            Event::SessionTerminated { .. } => "session:terminated",
            Event::CleanupComplete => "system:cleanup_complete",
        }
    }

    /// Session this event concerns, if any.
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Event::SessionCreated { session_id, .. }
            | Event::CommandSent { session_id, .. }
            | Event::ModeChanged { session_id }
            | Event::ConfirmationRequired { session_id, .. }
            | Event::ConfirmationResponded { session_id, .. }
            | Event::ConfirmationResolved { session_id, .. }
            | Event::PromptSent { session_id, .. }
            | Event::SessionEnded { session_id }
            | Event::SessionError { session_id, .. }
            | Event::SessionTerminated { session_id } => Some(session_id),
            Event::CleanupComplete => None,
        }
    }

    /// One-line form for logs. Never includes prompt or captured text.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::SessionCreated {
                session_id,
                working_directory,
                ..
            } => format!("{t} id={session_id} cwd={}", working_directory.display()),
            Event::CommandSent {
                session_id,
                command,
            } => format!("{t} id={session_id} len={}", command.len()),
            Event::ConfirmationRequired {
                session_id, job_id, ..
            }
            | Event::ConfirmationResolved {
                session_id, job_id, ..
            }
            | Event::PromptSent {
                session_id, job_id, ..
            } => match job_id {
                Some(job) => format!("{t} id={session_id} job={job}"),
                None => format!("{t} id={session_id}"),
            },
            Event::ConfirmationResponded {
                session_id,
                approved,
            } => format!("{t} id={session_id} approved={approved}"),
            Event::SessionError { session_id, error } => {
                format!("{t} id={session_id} error={error}")
            }
            Event::ModeChanged { session_id }
            | Event::SessionEnded { session_id }
            | Event::SessionTerminated { session_id } => format!("{t} id={session_id}"),
            Event::CleanupComplete => t.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
