// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Runner: drives one prompt through an agent session to completion.
//!
//! The runner creates (or resumes) a session through the facade, sends the
//! prompt, and then polls the screen, persisting newly appeared text as
//! assistant messages until a completion phrase shows up, the session goes
//! away, the job is cancelled, or the ceiling elapses. Confirmations are
//! recorded and left for a human; the runner never answers them.

use crate::client::InteractiveClient;
use crate::env;
use crate::patterns::PatternTable;
use ah_adapters::{RecordStore, SessionAdapter};
use ah_core::{epoch_ms, Event, IdGen, JobId, MessageRole, SessionId};
use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Lines captured per poll
const OUTPUT_LINES: u32 = 50;

/// What to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub job_id: JobId,
    pub prompt: String,
    pub working_directory: PathBuf,
    /// Agent label for the transcript
    pub agent: String,
    /// Pre-chosen session id (e.g. the one a worktree was provisioned for)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_token: Option<String>,
}

/// How a job ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    Completed,
    SessionEnded,
    TimedOut,
    Cancelled,
    Failed(String),
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Completed => write!(f, "completed"),
            JobOutcome::SessionEnded => write!(f, "session ended"),
            JobOutcome::TimedOut => write!(f, "timed out"),
            JobOutcome::Cancelled => write!(f, "cancelled"),
            JobOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: JobId,
    /// Session the job ran in; left alive for resumption
    pub session_id: Option<SessionId>,
    pub outcome: JobOutcome,
}

#[derive(Debug, Clone)]
pub struct JobRunnerConfig {
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub output_lines: u32,
    pub completion_patterns: Arc<PatternTable>,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            max_wait: Duration::from_secs(600),
            output_lines: OUTPUT_LINES,
            completion_patterns: PatternTable::completion(),
        }
    }
}

impl JobRunnerConfig {
    pub fn from_env() -> Self {
        Self {
            poll_interval: env::job_poll_ms(),
            max_wait: env::job_max_wait_ms(),
            ..Self::default()
        }
    }
}

/// Runs jobs against an [`InteractiveClient`], writing transcripts to `R`
pub struct JobRunner<S: SessionAdapter, G: IdGen, R: RecordStore> {
    client: InteractiveClient<S, G>,
    store: R,
    config: JobRunnerConfig,
}

impl<S: SessionAdapter, G: IdGen, R: RecordStore> Clone for JobRunner<S, G, R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

/// Per-run polling state
struct Progress {
    previous: String,
    confirmation_pending: bool,
    waiting_logged: bool,
}

impl<S: SessionAdapter, G: IdGen, R: RecordStore> JobRunner<S, G, R> {
    pub fn new(client: InteractiveClient<S, G>, store: R, config: JobRunnerConfig) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    pub fn client(&self) -> &InteractiveClient<S, G> {
        &self.client
    }

    /// Run `spec` to an outcome. Never fails; problems become
    /// [`JobOutcome::Failed`].
    pub async fn run(&self, spec: JobSpec, cancel: CancellationToken) -> JobReport {
        let span = tracing::info_span!("job", job_id = %spec.job_id);
        self.run_inner(spec, cancel).instrument(span).await
    }

    async fn run_inner(&self, spec: JobSpec, cancel: CancellationToken) -> JobReport {
        let job_id = spec.job_id.clone();
        // Subscribe before creating so no confirmation can slip past
        let mut events = self.client.subscribe();

        self.note(&job_id, MessageRole::System, &format!("Starting job {}", job_id))
            .await;
        self.note(&job_id, MessageRole::System, &format!("Start time: {}", epoch_ms()))
            .await;
        self.note(&job_id, MessageRole::System, &format!("Agent: {}", spec.agent))
            .await;
        self.note(
            &job_id,
            MessageRole::System,
            &format!("Working directory: {}", spec.working_directory.display()),
        )
        .await;

        let created = match &spec.session_id {
            Some(id) => {
                self.client
                    .create_session_with_id(
                        id.clone(),
                        Some(job_id.clone()),
                        &spec.working_directory,
                        spec.resume_token.as_deref(),
                    )
                    .await
            }
            None => {
                self.client
                    .create_session(
                        Some(job_id.clone()),
                        &spec.working_directory,
                        spec.resume_token.as_deref(),
                    )
                    .await
            }
        };
        let session_id = match created {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "job session creation failed");
                return self
                    .finish(&spec, None, JobOutcome::Failed(e.to_string()))
                    .await;
            }
        };
        self.note(
            &job_id,
            MessageRole::System,
            &format!("Session created: {}", session_id),
        )
        .await;

        // Whatever is on screen before the prompt is not agent output
        let baseline = self
            .client
            .get_session_output(session_id.as_str(), self.config.output_lines)
            .await
            .unwrap_or_default();

        if let Err(e) = self.client.send_prompt(session_id.as_str(), &spec.prompt).await {
            tracing::error!(%session_id, error = %e, "failed to send prompt");
            return self
                .finish(&spec, Some(session_id), JobOutcome::Failed(e.to_string()))
                .await;
        }
        self.note(&job_id, MessageRole::User, &spec.prompt).await;
        self.note(&job_id, MessageRole::System, "Prompt sent").await;

        let mut progress = Progress {
            previous: baseline,
            confirmation_pending: false,
            waiting_logged: false,
        };
        let deadline = tokio::time::sleep(self.config.max_wait);
        tokio::pin!(deadline);
        let mut poll = tokio::time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll.tick().await;

        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break JobOutcome::Cancelled,
                _ = &mut deadline => break JobOutcome::TimedOut,
                event = events.recv() => {
                    let Some(event) = event else {
                        break JobOutcome::Failed("event stream closed".to_string());
                    };
                    if event.session_id() != Some(&session_id) {
                        continue;
                    }
                    if let Some(outcome) = self.on_event(&job_id, event, &mut progress).await {
                        break outcome;
                    }
                }
                _ = poll.tick() => {
                    if self.poll(&spec, &session_id, &mut progress).await {
                        break JobOutcome::Completed;
                    }
                }
            }
        };

        self.finish(&spec, Some(session_id), outcome).await
    }

    async fn on_event(
        &self,
        job_id: &JobId,
        event: Event,
        progress: &mut Progress,
    ) -> Option<JobOutcome> {
        match event {
            Event::ConfirmationRequired { output, .. } => {
                tracing::info!("confirmation required");
                if let Err(e) = self.store.append_confirmation(job_id, &output).await {
                    tracing::warn!(error = %e, "failed to store confirmation record");
                }
                self.note(
                    job_id,
                    MessageRole::System,
                    &format!("Confirmation required: {}", output),
                )
                .await;
                progress.confirmation_pending = true;
                progress.waiting_logged = false;
                None
            }
            Event::ConfirmationResolved { approved, .. } => {
                let verdict = if approved { "approved" } else { "denied" };
                self.note(
                    job_id,
                    MessageRole::System,
                    &format!("Confirmation {} by user", verdict),
                )
                .await;
                progress.confirmation_pending = false;
                None
            }
            Event::SessionEnded { .. } | Event::SessionTerminated { .. } => {
                Some(JobOutcome::SessionEnded)
            }
            Event::SessionError { error, .. } => {
                self.note(job_id, MessageRole::System, &format!("Session error: {}", error))
                    .await;
                Some(JobOutcome::SessionEnded)
            }
            _ => None,
        }
    }

    /// One poll. Returns true when a completion phrase appeared.
    async fn poll(&self, spec: &JobSpec, session_id: &SessionId, progress: &mut Progress) -> bool {
        if progress.confirmation_pending && !progress.waiting_logged {
            self.note(
                &spec.job_id,
                MessageRole::System,
                "Waiting for user confirmation",
            )
            .await;
            progress.waiting_logged = true;
        }

        let current = match self
            .client
            .get_session_output(session_id.as_str(), self.config.output_lines)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                // A vanished session is reported through events
                tracing::debug!(error = %e, "poll: output unavailable");
                return false;
            }
        };

        let fresh = new_output(&progress.previous, &current);
        progress.previous = current;
        if fresh.trim().is_empty() {
            return false;
        }
        self.note(&spec.job_id, MessageRole::Assistant, &fresh).await;

        let answer = fresh.replace(spec.prompt.as_str(), "");
        match self.config.completion_patterns.first_match(&answer) {
            Some(pattern) => {
                tracing::info!(pattern, "completion detected");
                true
            }
            None => false,
        }
    }

    async fn finish(
        &self,
        spec: &JobSpec,
        session_id: Option<SessionId>,
        outcome: JobOutcome,
    ) -> JobReport {
        let listing = match list_visible(&spec.working_directory).await {
            Ok(entries) if entries.is_empty() => "Working directory is empty".to_string(),
            Ok(entries) => format!("Working directory contents: {}", entries.join(", ")),
            Err(e) => format!("Could not list working directory: {}", e),
        };
        self.note(&spec.job_id, MessageRole::System, &listing).await;
        self.note(
            &spec.job_id,
            MessageRole::System,
            &format!("Job finished: {}", outcome),
        )
        .await;
        tracing::info!(%outcome, session_id = ?session_id, "job finished");

        JobReport {
            job_id: spec.job_id.clone(),
            session_id,
            outcome,
        }
    }

    /// Append to the transcript; store failures are logged, never fatal.
    async fn note(&self, job_id: &JobId, role: MessageRole, content: &str) {
        if let Err(e) = self.store.append_message(job_id, role, content).await {
            tracing::warn!(%role, error = %e, "failed to store message");
        }
    }
}

/// Lines in `current` that were not already on screen in `previous`.
///
/// A line diff, not a suffix/prefix overlap: the agent keeps its input box
/// and status line pinned below new output, and the top scrolls away.
pub(crate) fn new_output(previous: &str, current: &str) -> String {
    if previous == current {
        return String::new();
    }
    let before: Vec<&str> = previous.lines().collect();
    let after: Vec<&str> = current.lines().collect();
    let mut fresh: Vec<&str> = Vec::new();
    for op in similar::capture_diff_slices(Algorithm::Myers, &before, &after) {
        let (tag, _, added) = op.as_tag_tuple();
        if matches!(tag, DiffTag::Insert | DiffTag::Replace) {
            fresh.extend_from_slice(&after[added]);
        }
    }
    fresh.join("\n")
}

/// Sorted names of non-hidden entries in `dir`
async fn list_visible(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
#[path = "job_runner_tests.rs"]
mod tests;
