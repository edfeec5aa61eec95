// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Accepts connections and maps each request onto a lifecycle-manager,
//! facade, or job operation. Subscriptions hold their connection open and
//! stream events until the client unsubscribes or disconnects.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ah_adapters::{RecordStore, SessionAdapter, WorktreeAdapter};
use ah_core::{JobId, SessionId, UuidIdGen};
use ah_engine::{CancellationToken, InteractiveClient, JobReport, JobRunner, JobSpec};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use ah_daemon::protocol::{self, ProtocolError, Request, Response, PROTOCOL_VERSION};

/// Agent label recorded in job transcripts when a request names none
const DEFAULT_AGENT: &str = "claude";

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Finished job reports kept for `ListJobs`; older ones are dropped
pub(crate) const FINISHED_JOBS_KEPT: usize = 100;

/// Builds the worktree provisioner for a project root
pub type WorktreeFactory<W> = Arc<dyn Fn(&Path) -> W + Send + Sync>;

#[derive(Default)]
struct JobTable {
    running: HashMap<String, CancellationToken>,
    finished: VecDeque<JobReport>,
}

/// Everything a request handler can reach
pub struct DaemonCtx<S: SessionAdapter, R: RecordStore, W: WorktreeAdapter> {
    pub client: InteractiveClient<S>,
    runner: JobRunner<S, UuidIdGen, R>,
    worktrees: WorktreeFactory<W>,
    jobs: Mutex<JobTable>,
    shutdown: Arc<Notify>,
    timeout: Duration,
}

impl<S: SessionAdapter, R: RecordStore, W: WorktreeAdapter> DaemonCtx<S, R, W> {
    pub fn new(
        client: InteractiveClient<S>,
        runner: JobRunner<S, UuidIdGen, R>,
        worktrees: WorktreeFactory<W>,
        shutdown: Arc<Notify>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            runner,
            worktrees,
            jobs: Mutex::new(JobTable::default()),
            shutdown,
            timeout,
        }
    }

    /// Abort running jobs and terminate every session.
    pub async fn cleanup(&self) {
        let tokens: Vec<_> = self.jobs.lock().running.drain().collect();
        for (job_id, token) in tokens {
            debug!(%job_id, "cancelling job");
            token.cancel();
        }
        self.client.cleanup().await;
    }

    fn job_finished(&self, report: JobReport) {
        let mut jobs = self.jobs.lock();
        jobs.running.remove(report.job_id.as_str());
        if jobs.finished.len() >= FINISHED_JOBS_KEPT {
            jobs.finished.pop_front();
        }
        jobs.finished.push_back(report);
    }
}

/// Listener task for accepting socket connections.
pub struct Listener<S: SessionAdapter, R: RecordStore, W: WorktreeAdapter> {
    socket: UnixListener,
    ctx: Arc<DaemonCtx<S, R, W>>,
}

impl<S: SessionAdapter, R: RecordStore, W: WorktreeAdapter> Listener<S, R, W> {
    pub fn new(socket: UnixListener, ctx: Arc<DaemonCtx<S, R, W>>) -> Self {
        Self { socket, ctx }
    }

    /// Run the listener loop, spawning a task per connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, ctx).await {
                            match e {
                                ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
                                    debug!("Client disconnected")
                                }
                                ConnectionError::Protocol(ProtocolError::Timeout) => {
                                    warn!("Connection timeout")
                                }
                                _ => error!("Connection error: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection<S: SessionAdapter, R: RecordStore, W: WorktreeAdapter>(
    stream: UnixStream,
    ctx: Arc<DaemonCtx<S, R, W>>,
) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, ctx.timeout).await?;

    if matches!(request, Request::Subscribe) {
        debug!("event subscription opened");
        return stream_events(reader, writer, &ctx).await;
    }

    // Polling requests at debug, mutations at info
    if matches!(
        request,
        Request::Ping
            | Request::ListSessions
            | Request::ActiveSessions
            | Request::PendingConfirmations
            | Request::GetOutput { .. }
            | Request::GetSessionOutput { .. }
            | Request::ListJobs
    ) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, &ctx).await;
    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, ctx.timeout).await?;
    Ok(())
}

/// Stream events until the client unsubscribes or hangs up.
async fn stream_events<S: SessionAdapter, R: RecordStore, W: WorktreeAdapter>(
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    ctx: &DaemonCtx<S, R, W>,
) -> Result<(), ConnectionError> {
    let mut subscription = ctx.client.subscribe();
    protocol::write_response(&mut writer, &Response::Subscribed, ctx.timeout).await?;

    // Created once so a partially read control frame is never dropped
    let control = protocol::read_message(&mut reader);
    tokio::pin!(control);

    let result = loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    break Ok(());
                };
                let frame = Response::Event { event };
                if let Err(e) = protocol::write_response(&mut writer, &frame, ctx.timeout).await {
                    break Err(e.into());
                }
            }
            frame = &mut control => {
                match frame.and_then(|bytes| protocol::decode::<Request>(&bytes)) {
                    Ok(Request::Unsubscribe) => {
                        subscription.unsubscribe();
                        break protocol::write_response(&mut writer, &Response::Unsubscribed, ctx.timeout)
                            .await
                            .map_err(Into::into);
                    }
                    Ok(other) => {
                        warn!(request = ?other, "unexpected request on event stream");
                        break Ok(());
                    }
                    Err(ProtocolError::ConnectionClosed) => break Ok(()),
                    Err(e) => break Err(e.into()),
                }
            }
        }
    };

    subscription.unsubscribe();
    debug!("event subscription closed");
    result
}

/// Handle a single request and return a response.
pub(crate) async fn handle_request<S: SessionAdapter, R: RecordStore, W: WorktreeAdapter>(
    request: Request,
    ctx: &Arc<DaemonCtx<S, R, W>>,
) -> Response {
    let manager = ctx.client.manager();
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }

        Request::CreateSession {
            session_id,
            working_directory,
            resume_token,
        } => match manager
            .create_session(
                SessionId::new(session_id),
                &working_directory,
                resume_token.as_deref(),
            )
            .await
        {
            Ok(id) => Response::SessionCreated {
                session_id: id.to_string(),
            },
            Err(e) => Response::error(e),
        },

        Request::SendCommand {
            session_id,
            command,
        } => ok_or_error(manager.send_command(&session_id, &command).await),

        Request::CycleModes { session_id } => {
            ok_or_error(manager.cycle_modes(&session_id).await)
        }

        Request::GetOutput { session_id, lines } => {
            match manager.get_output(&session_id, lines).await {
                Ok(output) => Response::Output { output },
                Err(e) => Response::error(e),
            }
        }

        Request::RespondConfirmation {
            session_id,
            approve,
        } => ok_or_error(manager.respond_confirmation(&session_id, approve).await),

        Request::TerminateSession { session_id } => {
            match manager.terminate_session(&session_id).await {
                Ok(existed) => Response::Terminated { existed },
                Err(e) => Response::error(e),
            }
        }

        Request::ListSessions => Response::Sessions {
            sessions: manager.list_sessions(),
        },

        Request::ClientCreateSession {
            job_id,
            working_directory,
            resume_token,
        } => match ctx
            .client
            .create_session(
                job_id.map(JobId::new),
                &working_directory,
                resume_token.as_deref(),
            )
            .await
        {
            Ok(id) => Response::SessionCreated {
                session_id: id.to_string(),
            },
            Err(e) => Response::error(e),
        },

        Request::SendPrompt { session_id, prompt } => {
            ok_or_error(ctx.client.send_prompt(&session_id, &prompt).await)
        }

        Request::GetSessionOutput { session_id, lines } => {
            match ctx.client.get_session_output(&session_id, lines).await {
                Ok(output) => Response::Output { output },
                Err(e) => Response::error(e),
            }
        }

        Request::RespondToConfirmation {
            session_id,
            approve,
        } => ok_or_error(
            ctx.client
                .respond_to_confirmation(&session_id, approve)
                .await,
        ),

        Request::ClientTerminateSession { session_id } => {
            match ctx.client.terminate_session(&session_id).await {
                Ok(existed) => Response::Terminated { existed },
                Err(e) => Response::error(e),
            }
        }

        Request::PendingConfirmations => Response::Confirmations {
            confirmations: ctx.client.pending_confirmations(),
        },

        Request::ActiveSessions => Response::ClientSessions {
            sessions: ctx.client.active_sessions(),
        },

        Request::RunJob {
            job_id,
            prompt,
            project_root,
            agent,
            resume_token,
            worktree,
        } => {
            let job = JobRequest {
                job_id,
                prompt,
                project_root,
                agent,
                resume_token,
                worktree,
            };
            run_job(ctx, job).await
        }

        Request::CancelJob { job_id } => match ctx.jobs.lock().running.get(&job_id) {
            Some(token) => {
                token.cancel();
                Response::Ok
            }
            None => Response::error(format!("no running job: {}", job_id)),
        },

        Request::ListJobs => Response::Jobs {
            jobs: ctx.jobs.lock().finished.iter().cloned().collect(),
        },

        Request::Subscribe => Response::error("subscribe must be the first request"),

        // Nothing to unsubscribe from outside a stream
        Request::Unsubscribe => Response::Unsubscribed,
    }
}

fn ok_or_error<E: std::fmt::Display>(result: Result<(), E>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(e) => Response::error(e),
    }
}

struct JobRequest {
    job_id: Option<String>,
    prompt: String,
    project_root: PathBuf,
    agent: Option<String>,
    resume_token: Option<String>,
    worktree: bool,
}

/// Provision the job's directory and start its runner in the background.
async fn run_job<S: SessionAdapter, R: RecordStore, W: WorktreeAdapter>(
    ctx: &Arc<DaemonCtx<S, R, W>>,
    job: JobRequest,
) -> Response {
    let job_id = JobId::new(
        job.job_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    );
    let cancel = CancellationToken::new();
    {
        let mut jobs = ctx.jobs.lock();
        if jobs.running.contains_key(job_id.as_str()) {
            return Response::error(format!("job already running: {}", job_id));
        }
        jobs.running.insert(job_id.to_string(), cancel.clone());
    }

    let session_id = SessionId::new(uuid::Uuid::new_v4().to_string());
    let working_directory = if job.worktree {
        match (ctx.worktrees)(&job.project_root).create(&session_id).await {
            Ok(worktree) => {
                info!(%job_id, branch = %worktree.branch, "worktree provisioned");
                worktree.path
            }
            Err(e) => {
                ctx.jobs.lock().running.remove(job_id.as_str());
                return Response::error(e);
            }
        }
    } else {
        job.project_root
    };

    let spec = JobSpec {
        job_id: job_id.clone(),
        prompt: job.prompt,
        working_directory: working_directory.clone(),
        agent: job.agent.unwrap_or_else(|| DEFAULT_AGENT.to_string()),
        session_id: Some(session_id.clone()),
        resume_token: job.resume_token,
    };

    let runner = ctx.runner.clone();
    let job_ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        let report = runner.run(spec, cancel).await;
        job_ctx.job_finished(report);
    });

    Response::JobStarted {
        job_id: job_id.to_string(),
        session_id: session_id.to_string(),
        working_directory,
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
