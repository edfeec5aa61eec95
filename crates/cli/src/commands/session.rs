// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ah session` - Session management commands

use std::io::Write;
use std::path::PathBuf;

use ah_core::SessionInfo;
use ah_daemon::DEFAULT_OUTPUT_LINES;
use ah_engine::ClientSession;
use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{format_time_ago, print_json, print_output_frame, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start an agent in a new session
    Create {
        /// Working directory (default: current directory)
        #[arg(long, short = 'C')]
        dir: Option<PathBuf>,
        /// Resume a previous agent conversation
        #[arg(long)]
        resume: Option<String>,
        /// Use this session id instead of generating one
        #[arg(long)]
        id: Option<String>,
        /// Associate the session with a job
        #[arg(long, conflicts_with = "id")]
        job: Option<String>,
    },
    /// Type a command into a session and submit it
    Send {
        /// Session ID or handle
        id: String,
        /// Text to send
        text: String,
    },
    /// Show the last lines of a session's terminal
    Output {
        /// Session ID or handle
        id: String,
        /// Number of lines to capture
        #[arg(short = 'n', long, default_value_t = DEFAULT_OUTPUT_LINES)]
        lines: u32,
    },
    /// Answer the session's pending confirmation
    Confirm {
        /// Session ID or handle
        id: String,
        /// Answer no instead of yes
        #[arg(long)]
        deny: bool,
        /// Send the answer even if no confirmation is pending
        #[arg(long)]
        force: bool,
    },
    /// Cycle the agent's operating mode
    Mode {
        /// Session ID or handle
        id: String,
    },
    /// Terminate a session
    Kill {
        /// Session ID or handle
        id: String,
    },
    /// List sessions
    List {
        /// Only sessions created through the client facade, with job context
        #[arg(long)]
        tracked: bool,
    },
}

pub async fn handle(
    command: SessionCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        SessionCommand::Create {
            dir,
            resume,
            id,
            job,
        } => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let session_id = match id {
                Some(id) => client.create_session(&id, dir, resume).await?,
                None => client.client_create_session(job, dir, resume).await?,
            };
            match format {
                OutputFormat::Text => println!("Created session {}", session_id),
                OutputFormat::Json => {
                    print_json(&serde_json::json!({ "session_id": session_id }))?
                }
            }
        }
        SessionCommand::Send { id, text } => {
            client.send_command(&id, &text).await?;
            println!("Sent to session {}", id);
        }
        SessionCommand::Output { id, lines } => {
            let output = client.get_output(&id, lines).await?;
            match format {
                OutputFormat::Text => print_output_frame(&id, &output),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "session_id": id,
                    "output": output,
                }))?,
            }
        }
        SessionCommand::Confirm { id, deny, force } => {
            let approve = !deny;
            if force {
                client.respond_confirmation(&id, approve).await?;
            } else {
                client.respond_to_confirmation(&id, approve).await?;
            }
            let verb = if approve { "Approved" } else { "Denied" };
            println!("{} confirmation for session {}", verb, id);
        }
        SessionCommand::Mode { id } => {
            client.cycle_modes(&id).await?;
            println!("Cycled mode for session {}", id);
        }
        SessionCommand::Kill { id } => {
            if client.client_terminate_session(&id).await? {
                println!("Killed session {}", id);
            } else {
                println!("Session {} not found", id);
            }
        }
        SessionCommand::List { tracked: false } => {
            let sessions = client.list_sessions().await?;
            match format {
                OutputFormat::Text if sessions.is_empty() => println!("No sessions"),
                OutputFormat::Text => format_session_list(&mut std::io::stdout(), &sessions),
                OutputFormat::Json => print_json(&sessions)?,
            }
        }
        SessionCommand::List { tracked: true } => {
            let sessions = client.active_sessions().await?;
            match format {
                OutputFormat::Text if sessions.is_empty() => println!("No sessions"),
                OutputFormat::Text => format_tracked_list(&mut std::io::stdout(), &sessions),
                OutputFormat::Json => print_json(&sessions)?,
            }
        }
    }
    Ok(())
}

pub(crate) fn format_session_list(w: &mut impl Write, sessions: &[SessionInfo]) {
    let mut table = Table::new(vec![
        Column::new("SESSION").with_max(36),
        Column::new("STATUS"),
        Column::new("ACTIVE"),
        Column::new("DIRECTORY"),
    ]);
    for s in sessions {
        table.row(vec![
            s.session_id.to_string(),
            if s.is_active { "active" } else { "inactive" }.to_string(),
            format_time_ago(s.last_activity_ms),
            s.working_directory.display().to_string(),
        ]);
    }
    table.render(w);
}

pub(crate) fn format_tracked_list(w: &mut impl Write, sessions: &[ClientSession]) {
    let mut table = Table::new(vec![
        Column::new("SESSION").with_max(36),
        Column::new("JOB").with_max(36),
        Column::new("ACTIVE"),
        Column::new("DIRECTORY"),
    ]);
    for s in sessions {
        table.row(vec![
            s.session_id.to_string(),
            s.job_id
                .as_ref()
                .map(|j| j.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format_time_ago(s.last_activity_ms),
            s.working_directory.display().to_string(),
        ]);
    }
    table.render(w);
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
