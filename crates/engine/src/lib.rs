// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Session orchestration engine.
//!
//! Layering, leaves first: [`SessionRegistry`] (authoritative session map),
//! the per-session confirmation monitor, [`SessionManager`] (lifecycle),
//! [`InteractiveClient`] (job-oriented facade) and [`JobRunner`].

mod client;
pub mod env;
mod error;
mod event_bus;
mod job_runner;
mod manager;
mod monitor;
mod patterns;
mod registry;

#[cfg(test)]
mod test_helpers;

pub use client::{ClientSession, InteractiveClient};
pub use error::{ClientError, ManagerError};
pub use event_bus::{EventBus, Subscription};
pub use job_runner::{JobOutcome, JobReport, JobRunner, JobRunnerConfig, JobSpec};
pub use manager::{ManagerConfig, SessionManager};
pub use patterns::PatternTable;
pub use registry::SessionRegistry;
pub use tokio_util::sync::CancellationToken;
