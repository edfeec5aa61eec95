// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::{Path, PathBuf};
use std::time::Duration;

use ah_core::{Event, PendingConfirmation, SessionInfo};
use ah_daemon::protocol::{self, ProtocolError};
use ah_daemon::{Request, Response};
use ah_engine::{ClientSession, JobReport};
use thiserror::Error;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

use crate::env::{state_dir, timeout_ipc};

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running (start it with `ahd`)")]
    DaemonNotRunning,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,
}

/// What `RunJob` reports back
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StartedJob {
    pub job_id: String,
    pub session_id: String,
    pub working_directory: PathBuf,
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Connect to the running daemon. Never starts one.
    pub fn connect() -> Result<Self, ClientError> {
        let dir = state_dir().ok_or(ClientError::NoStateDir)?;
        Self::at(dir.join("daemon.sock"))
    }

    /// Client for an explicit socket path
    pub fn at(socket_path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let socket_path = socket_path.into();
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self {
            socket_path,
            timeout: timeout_ipc(),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    async fn open(&self) -> Result<(OwnedReadHalf, OwnedWriteHalf), ClientError> {
        let stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound
                ) =>
            {
                return Err(ClientError::DaemonNotRunning)
            }
            Err(e) => return Err(e.into()),
        };
        Ok(stream.into_split())
    }

    /// Send one request and read its response. `Response::Error` becomes
    /// [`ClientError::Rejected`].
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let (mut reader, mut writer) = self.open().await?;
        protocol::write_request(&mut writer, request, self.timeout).await?;
        match protocol::read_response(&mut reader, self.timeout).await? {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            response => Ok(response),
        }
    }

    async fn send_ok(&self, request: Request) -> Result<(), ClientError> {
        match self.send(&request).await? {
            Response::Ok => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    async fn send_created(&self, request: Request) -> Result<String, ClientError> {
        match self.send(&request).await? {
            Response::SessionCreated { session_id } => Ok(session_id),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    async fn send_output(&self, request: Request) -> Result<String, ClientError> {
        match self.send(&request).await? {
            Response::Output { output } => Ok(output),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    async fn send_terminated(&self, request: Request) -> Result<bool, ClientError> {
        match self.send(&request).await? {
            Response::Terminated { existed } => Ok(existed),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    // -- lifecycle manager ----------------------------------------------------

    pub async fn create_session(
        &self,
        session_id: &str,
        working_directory: PathBuf,
        resume_token: Option<String>,
    ) -> Result<String, ClientError> {
        self.send_created(Request::CreateSession {
            session_id: session_id.to_string(),
            working_directory,
            resume_token,
        })
        .await
    }

    pub async fn send_command(&self, session_id: &str, command: &str) -> Result<(), ClientError> {
        self.send_ok(Request::SendCommand {
            session_id: session_id.to_string(),
            command: command.to_string(),
        })
        .await
    }

    pub async fn cycle_modes(&self, session_id: &str) -> Result<(), ClientError> {
        self.send_ok(Request::CycleModes {
            session_id: session_id.to_string(),
        })
        .await
    }

    pub async fn get_output(&self, session_id: &str, lines: u32) -> Result<String, ClientError> {
        self.send_output(Request::GetOutput {
            session_id: session_id.to_string(),
            lines,
        })
        .await
    }

    pub async fn respond_confirmation(
        &self,
        session_id: &str,
        approve: bool,
    ) -> Result<(), ClientError> {
        self.send_ok(Request::RespondConfirmation {
            session_id: session_id.to_string(),
            approve,
        })
        .await
    }

    pub async fn terminate_session(&self, session_id: &str) -> Result<bool, ClientError> {
        self.send_terminated(Request::TerminateSession {
            session_id: session_id.to_string(),
        })
        .await
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionInfo>, ClientError> {
        match self.send(&Request::ListSessions).await? {
            Response::Sessions { sessions } => Ok(sessions),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    // -- facade -----------------------------------------------------------------

    pub async fn client_create_session(
        &self,
        job_id: Option<String>,
        working_directory: PathBuf,
        resume_token: Option<String>,
    ) -> Result<String, ClientError> {
        self.send_created(Request::ClientCreateSession {
            job_id,
            working_directory,
            resume_token,
        })
        .await
    }

    pub async fn send_prompt(&self, session_id: &str, prompt: &str) -> Result<(), ClientError> {
        self.send_ok(Request::SendPrompt {
            session_id: session_id.to_string(),
            prompt: prompt.to_string(),
        })
        .await
    }

    pub async fn respond_to_confirmation(
        &self,
        session_id: &str,
        approve: bool,
    ) -> Result<(), ClientError> {
        self.send_ok(Request::RespondToConfirmation {
            session_id: session_id.to_string(),
            approve,
        })
        .await
    }

    pub async fn client_terminate_session(&self, session_id: &str) -> Result<bool, ClientError> {
        self.send_terminated(Request::ClientTerminateSession {
            session_id: session_id.to_string(),
        })
        .await
    }

    pub async fn pending_confirmations(&self) -> Result<Vec<PendingConfirmation>, ClientError> {
        match self.send(&Request::PendingConfirmations).await? {
            Response::Confirmations { confirmations } => Ok(confirmations),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn active_sessions(&self) -> Result<Vec<ClientSession>, ClientError> {
        match self.send(&Request::ActiveSessions).await? {
            Response::ClientSessions { sessions } => Ok(sessions),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    // -- jobs -------------------------------------------------------------------

    pub async fn run_job(&self, request: Request) -> Result<StartedJob, ClientError> {
        match self.send(&request).await? {
            Response::JobStarted {
                job_id,
                session_id,
                working_directory,
            } => Ok(StartedJob {
                job_id,
                session_id,
                working_directory,
            }),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn cancel_job(&self, job_id: &str) -> Result<(), ClientError> {
        self.send_ok(Request::CancelJob {
            job_id: job_id.to_string(),
        })
        .await
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobReport>, ClientError> {
        match self.send(&Request::ListJobs).await? {
            Response::Jobs { jobs } => Ok(jobs),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    // -- events -----------------------------------------------------------------

    /// Open an event stream.
    pub async fn subscribe(&self) -> Result<EventStream, ClientError> {
        let (mut reader, mut writer) = self.open().await?;
        protocol::write_request(&mut writer, &Request::Subscribe, self.timeout).await?;
        match protocol::read_response(&mut reader, self.timeout).await? {
            Response::Subscribed => Ok(EventStream {
                reader,
                writer,
                timeout: self.timeout,
                closed: false,
            }),
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

/// Open event subscription
pub struct EventStream {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    timeout: Duration,
    closed: bool,
}

impl EventStream {
    /// Next event, or `None` once the daemon ends the stream.
    pub async fn next(&mut self) -> Result<Option<Event>, ClientError> {
        if self.closed {
            return Ok(None);
        }
        loop {
            let bytes = match protocol::read_message(&mut self.reader).await {
                Ok(bytes) => bytes,
                Err(ProtocolError::ConnectionClosed) => {
                    self.closed = true;
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            match protocol::decode::<Response>(&bytes)? {
                Response::Event { event } => return Ok(Some(event)),
                Response::Unsubscribed => {
                    self.closed = true;
                    return Ok(None);
                }
                _ => continue,
            }
        }
    }

    /// Ask the daemon to end the stream and wait for it to confirm.
    /// Calling it again is a no-op.
    pub async fn unsubscribe(&mut self) -> Result<(), ClientError> {
        if self.closed {
            return Ok(());
        }
        protocol::write_request(&mut self.writer, &Request::Unsubscribe, self.timeout).await?;
        while self.next().await?.is_some() {}
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
