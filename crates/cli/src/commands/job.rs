// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ah job` - Run prompts as background jobs

use std::io::Write;
use std::path::PathBuf;

use ah_daemon::Request;
use ah_engine::JobReport;
use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Start a job: provision a worktree, launch the agent, send the prompt
    Run {
        /// Prompt for the agent
        prompt: String,
        /// Project root (default: current directory)
        #[arg(long, short = 'C')]
        project: Option<PathBuf>,
        /// Job id (default: generated)
        #[arg(long)]
        id: Option<String>,
        /// Agent label recorded in the transcript
        #[arg(long)]
        agent: Option<String>,
        /// Resume a previous agent conversation
        #[arg(long)]
        resume: Option<String>,
        /// Run in the project directory itself instead of a worktree
        #[arg(long)]
        no_worktree: bool,
    },
    /// Abort a running job
    Cancel {
        /// Job id
        id: String,
    },
    /// List finished jobs
    List,
}

pub async fn handle(command: JobCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        JobCommand::Run {
            prompt,
            project,
            id,
            agent,
            resume,
            no_worktree,
        } => {
            let project_root = match project {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let started = client
                .run_job(Request::RunJob {
                    job_id: id,
                    prompt,
                    project_root,
                    agent,
                    resume_token: resume,
                    worktree: !no_worktree,
                })
                .await?;
            match format {
                OutputFormat::Text => {
                    println!("Started job {}", started.job_id);
                    println!("  session:   {}", started.session_id);
                    println!("  directory: {}", started.working_directory.display());
                }
                OutputFormat::Json => print_json(&started)?,
            }
        }
        JobCommand::Cancel { id } => {
            client.cancel_job(&id).await?;
            println!("Cancelled job {}", id);
        }
        JobCommand::List => {
            let jobs = client.list_jobs().await?;
            match format {
                OutputFormat::Text if jobs.is_empty() => println!("No finished jobs"),
                OutputFormat::Text => format_job_list(&mut std::io::stdout(), &jobs),
                OutputFormat::Json => print_json(&jobs)?,
            }
        }
    }
    Ok(())
}

pub(crate) fn format_job_list(w: &mut impl Write, jobs: &[JobReport]) {
    let mut table = Table::new(vec![
        Column::new("JOB").with_max(36),
        Column::new("SESSION").with_max(36),
        Column::new("OUTCOME"),
    ]);
    for job in jobs {
        table.row(vec![
            job.job_id.to_string(),
            job.session_id
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            job.outcome.to_string(),
        ]);
    }
    table.render(w);
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
