// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ah - agenthub CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod env;
mod output;
mod table;

use output::OutputFormat;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{confirmations, daemon, job, prompt, session, watch};

use crate::client::DaemonClient;

#[derive(Parser)]
#[command(name = "ah", version, about = "agenthub - run coding agents in tmux sessions")]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Session management
    Session(session::SessionArgs),
    /// Send a prompt to a session
    Prompt(prompt::PromptArgs),
    /// List confirmations waiting for an answer
    Confirmations,
    /// Background jobs
    Job(job::JobArgs),
    /// Stream events from the daemon
    Watch(watch::WatchArgs),
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", format_error(&e));
        std::process::exit(1);
    }
}

/// Format an anyhow error, skipping causes the top-level message
/// already includes.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let client = DaemonClient::connect()?;
    match command {
        Commands::Session(args) => session::handle(args.command, &client, format).await?,
        Commands::Prompt(args) => prompt::handle(args, &client).await?,
        Commands::Confirmations => confirmations::handle(&client, format).await?,
        Commands::Job(args) => job::handle(args.command, &client, format).await?,
        Commands::Watch(args) => watch::handle(args, &client, format).await?,
        Commands::Daemon(args) => daemon::handle(args, &client, format).await?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
