// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake toolchain for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SetupError, Toolchain};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainCall {
    BinaryPresent,
    PackageManagerPresent,
    InstallPackageManager,
    InstallBinary,
}

#[derive(Default)]
struct FakeToolchainState {
    binary: bool,
    package_manager: bool,
    fail_package_manager_install: bool,
    fail_binary_install: bool,
    calls: Vec<ToolchainCall>,
}

/// Toolchain whose probes and installs flip in-memory flags
#[derive(Clone, Default)]
pub struct FakeToolchain {
    inner: Arc<Mutex<FakeToolchainState>>,
}

impl FakeToolchain {
    /// Binary already installed
    pub fn present() -> Self {
        let fake = Self::default();
        fake.inner.lock().binary = true;
        fake
    }

    /// Nothing installed; installs succeed
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn with_package_manager(self) -> Self {
        self.inner.lock().package_manager = true;
        self
    }

    pub fn fail_package_manager_install(self) -> Self {
        self.inner.lock().fail_package_manager_install = true;
        self
    }

    pub fn fail_binary_install(self) -> Self {
        self.inner.lock().fail_binary_install = true;
        self
    }

    pub fn calls(&self) -> Vec<ToolchainCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl Toolchain for FakeToolchain {
    async fn binary_present(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(ToolchainCall::BinaryPresent);
        inner.binary
    }

    async fn package_manager_present(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(ToolchainCall::PackageManagerPresent);
        inner.package_manager
    }

    async fn install_package_manager(&self) -> Result<(), SetupError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ToolchainCall::InstallPackageManager);
        if inner.fail_package_manager_install {
            return Err(SetupError::PackageManagerInstall("curl failed".into()));
        }
        inner.package_manager = true;
        Ok(())
    }

    async fn install_binary(&self) -> Result<(), SetupError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ToolchainCall::InstallBinary);
        if inner.fail_binary_install || !inner.package_manager {
            return Err(SetupError::BinaryInstall("brew install tmux failed".into()));
        }
        inner.binary = true;
        Ok(())
    }
}
