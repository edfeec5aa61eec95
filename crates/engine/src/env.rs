// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Agent launch command (default: `claude`).
pub fn agent_command() -> String {
    std::env::var("AH_AGENT_COMMAND")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "claude".to_string())
}

/// Delay between creating a session and launching the agent (default: 500ms).
pub fn settle_ms() -> Duration {
    parse_duration_ms("AH_SETTLE_MS").unwrap_or(Duration::from_millis(500))
}

/// Confirmation monitor interval (default: 500ms).
pub fn monitor_poll_ms() -> Duration {
    parse_duration_ms("AH_MONITOR_POLL_MS").unwrap_or(Duration::from_millis(500))
}

/// Job runner output poll interval (default: 3000ms).
pub fn job_poll_ms() -> Duration {
    parse_duration_ms("AH_JOB_POLL_MS").unwrap_or(Duration::from_secs(3))
}

/// Job runner end-to-end ceiling (default: 600000ms).
pub fn job_max_wait_ms() -> Duration {
    parse_duration_ms("AH_JOB_MAX_WAIT_MS").unwrap_or(Duration::from_secs(600))
}
