// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod confirmations;
pub mod daemon;
pub mod job;
pub mod prompt;
pub mod session;
pub mod watch;
