// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `ah` and `ahd`.
//!
//! One request per connection, answered by one response. `Subscribe` is the
//! exception: the daemon answers `Subscribed` and then streams
//! `Response::Event` frames until the client sends `Unsubscribe` or hangs up.

use std::path::PathBuf;

use ah_core::{Event, PendingConfirmation, SessionInfo};
use ah_engine::{ClientSession, JobReport};
use serde::{Deserialize, Serialize};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    decode, encode, read_message, read_request, read_response, write_message, write_request,
    write_response, ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE,
};

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of lines for output requests
pub const DEFAULT_OUTPUT_LINES: u32 = 50;

fn default_lines() -> u32 {
    DEFAULT_OUTPUT_LINES
}

fn default_true() -> bool {
    true
}

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Terminate all sessions and stop the daemon
    Shutdown,

    // -- lifecycle manager -------------------------------------------------

    /// Create a session under a caller-chosen id
    CreateSession {
        session_id: String,
        working_directory: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resume_token: Option<String>,
    },

    SendCommand { session_id: String, command: String },

    /// Cycle the agent's operating mode
    CycleModes { session_id: String },

    GetOutput {
        session_id: String,
        #[serde(default = "default_lines")]
        lines: u32,
    },

    RespondConfirmation { session_id: String, approve: bool },

    TerminateSession { session_id: String },

    ListSessions,

    // -- interactive client facade ------------------------------------------

    /// Create a session with a generated id, optionally bound to a job
    ClientCreateSession {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<String>,
        working_directory: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resume_token: Option<String>,
    },

    SendPrompt { session_id: String, prompt: String },

    GetSessionOutput {
        session_id: String,
        #[serde(default = "default_lines")]
        lines: u32,
    },

    RespondToConfirmation { session_id: String, approve: bool },

    ClientTerminateSession { session_id: String },

    PendingConfirmations,

    ActiveSessions,

    // -- jobs ---------------------------------------------------------------

    /// Start a job in the background
    RunJob {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job_id: Option<String>,
        prompt: String,
        /// Project root; the job runs in a fresh worktree of it unless
        /// `worktree` is false
        project_root: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resume_token: Option<String>,
        #[serde(default = "default_true")]
        worktree: bool,
    },

    /// Abort a running job
    CancelJob { job_id: String },

    /// Finished job reports, oldest first
    ListJobs,

    // -- events -------------------------------------------------------------

    /// Turn this connection into an event stream
    Subscribe,

    /// End an event stream
    Unsubscribe,
}

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    Pong,

    Hello { version: String },

    ShuttingDown,

    SessionCreated { session_id: String },

    Output { output: String },

    /// Terminate result; `existed` is false for unknown ids
    Terminated { existed: bool },

    Sessions { sessions: Vec<SessionInfo> },

    ClientSessions { sessions: Vec<ClientSession> },

    Confirmations { confirmations: Vec<PendingConfirmation> },

    JobStarted {
        job_id: String,
        session_id: String,
        working_directory: PathBuf,
    },

    Jobs { jobs: Vec<JobReport> },

    Subscribed,

    Event { event: Event },

    Unsubscribed,

    Error { message: String },
}

impl Response {
    pub fn error(message: impl std::fmt::Display) -> Self {
        Response::Error {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
