// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ah-core: Core types for the agenthub session orchestrator

pub mod clock;
pub mod confirmation;
pub mod event;
pub mod id;
pub mod job;
pub mod session;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{epoch_ms, format_age};
pub use confirmation::PendingConfirmation;
pub use event::Event;
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job::{ConfirmationStatus, JobId, MessageRole};
pub use session::{SessionId, SessionInfo, HANDLE_PREFIX};
