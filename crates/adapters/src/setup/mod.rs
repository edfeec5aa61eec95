// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multiplexer prerequisite check and one-time installation.
//!
//! Setup is lazy and process-wide: the first operation that needs the
//! multiplexer drives the state machine, later callers see the cached
//! result. Both `Configured` and `Failed` are terminal.

mod homebrew;

pub use homebrew::HomebrewToolchain;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeToolchain, ToolchainCall};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from multiplexer setup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("package manager install failed: {0}")]
    PackageManagerInstall(String),
    #[error("multiplexer install failed: {0}")]
    BinaryInstall(String),
    #[error("multiplexer still unavailable after install")]
    BinaryMissing,
    #[error("multiplexer setup previously failed: {0}")]
    PreviouslyFailed(String),
}

/// Probes and installers for the multiplexer binary and its package manager
#[async_trait]
pub trait Toolchain: Send + Sync + 'static {
    async fn binary_present(&self) -> bool;
    async fn package_manager_present(&self) -> bool;
    async fn install_package_manager(&self) -> Result<(), SetupError>;
    async fn install_binary(&self) -> Result<(), SetupError>;
}

/// Setup progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupState {
    Unconfigured,
    CheckingBinary,
    CheckingPackageManager,
    InstallingPackageManager,
    InstallingBinary,
    Configured,
    Failed(String),
}

/// Process-wide setup state machine
pub struct MultiplexerSetup {
    toolchain: Arc<dyn Toolchain>,
    state: Mutex<SetupState>,
}

impl MultiplexerSetup {
    pub fn new(toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            toolchain,
            state: Mutex::new(SetupState::Unconfigured),
        }
    }

    /// Setup backed by the real `tmux`/`brew` binaries
    pub fn homebrew() -> Self {
        Self::new(Arc::new(HomebrewToolchain))
    }

    pub async fn state(&self) -> SetupState {
        self.state.lock().await.clone()
    }

    /// Drive setup to `Configured`, or return the cached failure.
    ///
    /// Concurrent callers wait on the same lock, so the probes and installs
    /// run at most once per process.
    pub async fn ensure(&self) -> Result<(), SetupError> {
        let mut state = self.state.lock().await;
        match &*state {
            SetupState::Configured => return Ok(()),
            SetupState::Failed(reason) => {
                return Err(SetupError::PreviouslyFailed(reason.clone()));
            }
            _ => {}
        }

        match self.run(&mut state).await {
            Ok(()) => {
                *state = SetupState::Configured;
                tracing::info!("multiplexer configured");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "multiplexer setup failed");
                *state = SetupState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&self, state: &mut SetupState) -> Result<(), SetupError> {
        transition(state, SetupState::CheckingBinary);
        if self.toolchain.binary_present().await {
            return Ok(());
        }

        transition(state, SetupState::CheckingPackageManager);
        if !self.toolchain.package_manager_present().await {
            transition(state, SetupState::InstallingPackageManager);
            self.toolchain.install_package_manager().await?;
        }

        transition(state, SetupState::InstallingBinary);
        self.toolchain.install_binary().await?;

        if !self.toolchain.binary_present().await {
            return Err(SetupError::BinaryMissing);
        }
        Ok(())
    }
}

fn transition(state: &mut SetupState, next: SetupState) {
    tracing::debug!(from = ?state, to = ?next, "setup transition");
    *state = next;
}

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;
