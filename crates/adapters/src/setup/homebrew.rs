// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tmux via Homebrew

use super::{SetupError, Toolchain};
use crate::subprocess::{execute, PROBE_TIMEOUT, SETUP_INSTALL_TIMEOUT};
use async_trait::async_trait;
use tokio::process::Command;

const HOMEBREW_INSTALL_SCRIPT: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Probes `tmux -V` / `brew --version`; installs with the Homebrew script
/// and `brew install tmux`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomebrewToolchain;

#[async_trait]
impl Toolchain for HomebrewToolchain {
    async fn binary_present(&self) -> bool {
        let mut cmd = Command::new("tmux");
        cmd.arg("-V");
        execute(cmd, PROBE_TIMEOUT, "tmux -V").await.is_ok()
    }

    async fn package_manager_present(&self) -> bool {
        let mut cmd = Command::new("brew");
        cmd.arg("--version");
        execute(cmd, PROBE_TIMEOUT, "brew --version").await.is_ok()
    }

    async fn install_package_manager(&self) -> Result<(), SetupError> {
        tracing::info!("installing Homebrew");
        let mut cmd = Command::new("/bin/bash");
        cmd.arg("-c")
            .arg(format!(
                "/bin/bash -c \"$(curl -fsSL {})\"",
                HOMEBREW_INSTALL_SCRIPT
            ))
            .env("NONINTERACTIVE", "1");
        execute(cmd, SETUP_INSTALL_TIMEOUT, "homebrew install")
            .await
            .map(|_| ())
            .map_err(|e| SetupError::PackageManagerInstall(e.to_string()))
    }

    async fn install_binary(&self) -> Result<(), SetupError> {
        tracing::info!("installing tmux");
        let mut cmd = Command::new("brew");
        cmd.args(["install", "tmux"]);
        execute(cmd, SETUP_INSTALL_TIMEOUT, "brew install tmux")
            .await
            .map(|_| ())
            .map_err(|e| SetupError::BinaryInstall(e.to_string()))
    }
}
