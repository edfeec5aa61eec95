// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the orchestration engine

use ah_adapters::{SessionError, SetupError};
use ah_core::SessionId;
use thiserror::Error;

/// Errors from lifecycle manager operations
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("multiplexer setup failed: {0}")]
    Setup(#[from] SetupError),
    #[error("failed to create session {session_id}: {source}")]
    SessionCreation {
        session_id: SessionId,
        #[source]
        source: SessionError,
    },
    #[error("invalid session id {0:?}: must be non-empty, without '.', ':' or whitespace")]
    InvalidSessionId(String),
    #[error("invalid resume token {0:?}: only letters, digits, '-', '_' and '.' are allowed")]
    InvalidResumeToken(String),
    #[error("session already active: {0}")]
    AlreadyActive(SessionId),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("session is not active: {0}")]
    SessionInactive(SessionId),
    #[error("multiplexer command failed: {0}")]
    Process(#[from] SessionError),
}

/// Errors from the interactive client facade
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Manager(#[from] ManagerError),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("no pending confirmation for session {0}")]
    NoPendingConfirmation(String),
}
