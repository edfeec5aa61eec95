// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: processes, the multiplexer, git, transcripts

mod env;
pub mod session;
pub mod setup;
pub mod store;
pub mod subprocess;
pub mod traced;
pub mod worktree;

pub use session::{keys, SessionAdapter, SessionError, TmuxAdapter};
pub use setup::{HomebrewToolchain, MultiplexerSetup, SetupError, SetupState, Toolchain};
pub use store::{JsonlRecordStore, RecordStore, StoreError, TranscriptRecord};
pub use subprocess::ProcessError;
pub use traced::TracedSession;
pub use worktree::{GitWorktreeAdapter, Worktree, WorktreeAdapter, WorktreeError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSession, FakeSessionAdapter, SessionCall};
#[cfg(any(test, feature = "test-support"))]
pub use setup::{FakeToolchain, ToolchainCall};
#[cfg(any(test, feature = "test-support"))]
pub use store::FakeRecordStore;
#[cfg(any(test, feature = "test-support"))]
pub use worktree::FakeWorktreeAdapter;
