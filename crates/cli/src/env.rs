// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("AH_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Resolve state directory: AH_STATE_DIR > XDG_STATE_HOME/agenthub > ~/.local/state/agenthub
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("AH_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("agenthub"));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/state/agenthub"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
