// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ah prompt` - Send a prompt through the client facade

use anyhow::Result;
use clap::Args;

use crate::client::DaemonClient;

#[derive(Args)]
pub struct PromptArgs {
    /// Session ID or handle
    pub id: String,
    /// Prompt text
    pub prompt: String,
}

pub async fn handle(args: PromptArgs, client: &DaemonClient) -> Result<()> {
    client.send_prompt(&args.id, &args.prompt).await?;
    println!("Prompt sent to session {}", args.id);
    Ok(())
}
