// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ah daemon` - Daemon management commands

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};

/// How long `stop` waits for the socket to go away
const STOP_WAIT: Duration = Duration::from_secs(10);

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Check that the daemon answers
    Ping,
    /// Terminate all sessions and stop the daemon
    Stop,
}

pub async fn handle(args: DaemonArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Ping => {
            let version = client.hello().await?;
            match format {
                OutputFormat::Text => println!("ahd {} is running", version),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "running": true,
                    "version": version,
                    "socket": client.socket_path(),
                }))?,
            }
        }
        DaemonCommand::Stop => {
            client.shutdown().await?;
            let deadline = Instant::now() + STOP_WAIT;
            while client.socket_path().exists() {
                if Instant::now() >= deadline {
                    bail!("daemon did not stop within {}s", STOP_WAIT.as_secs());
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            println!("Daemon stopped");
        }
    }
    Ok(())
}
