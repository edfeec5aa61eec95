// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifiers and the multiplexer handle naming convention.
//!
//! A `SessionId` is the logical identifier supplied by whoever creates the
//! session. The multiplexer addresses the same session by its derived handle
//! (`codeagent-<id>`); operations accept either form.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix for multiplexer session handles.
pub const HANDLE_PREFIX: &str = "codeagent-";

crate::define_id! {
    /// Logical identifier for an agent session.
    ///
    /// Supplied by the caller (never generated by the lifecycle layer).
    /// The facade generates one per job session before handing it down.
    pub struct SessionId;
}

impl SessionId {
    /// Derived multiplexer handle used to address the OS-level session.
    pub fn handle(&self) -> String {
        format!("{}{}", HANDLE_PREFIX, self.0)
    }

    /// Inverse of [`SessionId::handle`]: strip the handle prefix if present.
    pub fn from_handle(handle: &str) -> Option<Self> {
        handle
            .strip_prefix(HANDLE_PREFIX)
            .filter(|rest| !rest.is_empty())
            .map(Self::new)
    }
}

/// Point-in-time view of a registered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub handle: String,
    pub working_directory: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_token: Option<String>,
    pub is_active: bool,
    pub created_at_ms: u64,
    pub last_activity_ms: u64,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
