// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive Client Facade.
//!
//! Maps job identities onto lifecycle-manager sessions. A forwarder task
//! consumes the manager's events, attaches job context to confirmations,
//! tracks at most one pending confirmation per session, drops records for
//! sessions that end or error, and republishes everything on the facade's
//! own bus.

use crate::error::{ClientError, ManagerError};
use crate::event_bus::{EventBus, Subscription};
use crate::manager::SessionManager;
use ah_adapters::SessionAdapter;
use ah_core::{
    epoch_ms, Event, IdGen, JobId, PendingConfirmation, SessionId, SessionInfo, UuidIdGen,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Facade-side record of a session it created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSession {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub working_directory: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_token: Option<String>,
    pub is_active: bool,
    pub created_at_ms: u64,
    pub last_activity_ms: u64,
}

#[derive(Default)]
struct ClientState {
    sessions: HashMap<SessionId, ClientSession>,
    pending: HashMap<SessionId, PendingConfirmation>,
}

/// Job-oriented facade over [`SessionManager`]
pub struct InteractiveClient<S: SessionAdapter, G: IdGen = UuidIdGen> {
    manager: SessionManager<S>,
    ids: G,
    state: Arc<Mutex<ClientState>>,
    events: EventBus,
}

impl<S: SessionAdapter, G: IdGen> Clone for InteractiveClient<S, G> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            ids: self.ids.clone(),
            state: Arc::clone(&self.state),
            events: self.events.clone(),
        }
    }
}

impl<S: SessionAdapter> InteractiveClient<S, UuidIdGen> {
    pub fn new(manager: SessionManager<S>) -> Self {
        Self::with_id_gen(manager, UuidIdGen)
    }
}

impl<S: SessionAdapter, G: IdGen> InteractiveClient<S, G> {
    /// Build the facade and start its forwarder. Must run inside a tokio
    /// runtime.
    pub fn with_id_gen(manager: SessionManager<S>, ids: G) -> Self {
        let client = Self {
            manager,
            ids,
            state: Arc::new(Mutex::new(ClientState::default())),
            events: EventBus::new(),
        };
        let upstream = client.manager.subscribe();
        tokio::spawn(forward(
            upstream,
            Arc::clone(&client.state),
            client.events.clone(),
        ));
        client
    }

    pub fn manager(&self) -> &SessionManager<S> {
        &self.manager
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    /// Create a session under a freshly generated id.
    pub async fn create_session(
        &self,
        job_id: Option<JobId>,
        working_directory: &Path,
        resume_token: Option<&str>,
    ) -> Result<SessionId, ClientError> {
        let session_id = SessionId::new(self.ids.next());
        self.create_session_with_id(session_id, job_id, working_directory, resume_token)
            .await
    }

    /// Create a session under a caller-chosen id (e.g. one a worktree was
    /// already provisioned for).
    pub async fn create_session_with_id(
        &self,
        session_id: SessionId,
        job_id: Option<JobId>,
        working_directory: &Path,
        resume_token: Option<&str>,
    ) -> Result<SessionId, ClientError> {
        let now = epoch_ms();
        // Registered before the manager call so confirmations raised during
        // launch already carry the job id.
        {
            let mut state = self.state.lock();
            if state.sessions.contains_key(&session_id) {
                return Err(ManagerError::AlreadyActive(session_id).into());
            }
            state.sessions.insert(
                session_id.clone(),
                ClientSession {
                    session_id: session_id.clone(),
                    job_id: job_id.clone(),
                    working_directory: working_directory.to_path_buf(),
                    resume_token: resume_token.map(String::from),
                    is_active: true,
                    created_at_ms: now,
                    last_activity_ms: now,
                },
            );
        }

        match self
            .manager
            .create_session(session_id.clone(), working_directory, resume_token)
            .await
        {
            Ok(id) => {
                tracing::info!(session_id = %id, job_id = ?job_id, "client session created");
                Ok(id)
            }
            Err(e) => {
                self.state.lock().sessions.remove(&session_id);
                Err(e.into())
            }
        }
    }

    /// Logical id for `key`, which may be an id or a handle.
    fn resolve(&self, key: &str) -> Result<SessionId, ClientError> {
        if let Some(id) = self.manager.resolve(key) {
            return Ok(id);
        }
        let state = self.state.lock();
        state
            .sessions
            .get_key_value(key)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| ClientError::SessionNotFound(key.to_string()))
    }

    /// Send a prompt to the agent.
    pub async fn send_prompt(&self, key: &str, prompt: &str) -> Result<(), ClientError> {
        let session_id = self.resolve(key)?;
        self.manager
            .send_command(session_id.as_str(), prompt)
            .await?;

        let job_id = {
            let mut state = self.state.lock();
            match state.sessions.get_mut(&session_id) {
                Some(session) => {
                    session.last_activity_ms = epoch_ms();
                    session.job_id.clone()
                }
                None => None,
            }
        };
        self.events.emit(Event::PromptSent {
            session_id,
            job_id,
            prompt: prompt.to_string(),
        });
        Ok(())
    }

    pub async fn get_session_output(&self, key: &str, lines: u32) -> Result<String, ClientError> {
        let session_id = self.resolve(key)?;
        Ok(self.manager.get_output(session_id.as_str(), lines).await?)
    }

    pub async fn cycle_modes(&self, key: &str) -> Result<(), ClientError> {
        let session_id = self.resolve(key)?;
        Ok(self.manager.cycle_modes(session_id.as_str()).await?)
    }

    /// Answer the pending confirmation for a session.
    ///
    /// Fails with `NoPendingConfirmation` when nothing is pending. The record
    /// is dropped only once the answer was delivered.
    pub async fn respond_to_confirmation(
        &self,
        key: &str,
        approve: bool,
    ) -> Result<(), ClientError> {
        let session_id = self.resolve(key)?;
        if !self.state.lock().pending.contains_key(&session_id) {
            return Err(ClientError::NoPendingConfirmation(key.to_string()));
        }

        self.manager
            .respond_confirmation(session_id.as_str(), approve)
            .await?;

        let resolved = self.state.lock().pending.remove(&session_id);
        let job_id = resolved.and_then(|p| p.job_id);
        tracing::info!(%session_id, approve, "confirmation resolved");
        self.events.emit(Event::ConfirmationResolved {
            session_id,
            job_id,
            approved: approve,
        });
        Ok(())
    }

    pub fn pending_confirmations(&self) -> Vec<PendingConfirmation> {
        let mut pending: Vec<_> = self.state.lock().pending.values().cloned().collect();
        pending.sort_by_key(|p| p.timestamp_ms);
        pending
    }

    pub fn pending_confirmation(&self, key: &str) -> Option<PendingConfirmation> {
        let session_id = self.resolve(key).ok()?;
        self.state.lock().pending.get(&session_id).cloned()
    }

    /// Terminate a session and drop its records. Unknown ids are a no-op.
    pub async fn terminate_session(&self, key: &str) -> Result<bool, ClientError> {
        let Ok(session_id) = self.resolve(key) else {
            return Ok(false);
        };
        {
            let mut state = self.state.lock();
            state.sessions.remove(&session_id);
            state.pending.remove(&session_id);
        }
        Ok(self.manager.terminate_session(session_id.as_str()).await?)
    }

    pub fn get_session(&self, key: &str) -> Option<ClientSession> {
        let session_id = self.resolve(key).ok()?;
        self.state.lock().sessions.get(&session_id).cloned()
    }

    /// Tracked sessions, oldest first
    pub fn active_sessions(&self) -> Vec<ClientSession> {
        let mut sessions: Vec<_> = self
            .state
            .lock()
            .sessions
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.created_at_ms);
        sessions
    }

    /// Manager-level view of every registered session
    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        self.manager.list_sessions()
    }

    /// Terminate every tracked session (best-effort), then tear down the
    /// manager.
    pub async fn cleanup(&self) {
        let ids: Vec<SessionId> = self.state.lock().sessions.keys().cloned().collect();
        for id in ids {
            if let Err(e) = self.terminate_session(id.as_str()).await {
                tracing::warn!(session_id = %id, error = %e, "cleanup: terminate failed");
            }
        }
        self.manager.cleanup().await;
    }
}

/// Consume manager events until the manager's bus goes away.
async fn forward(mut upstream: Subscription, state: Arc<Mutex<ClientState>>, events: EventBus) {
    while let Some(event) = upstream.recv().await {
        let event = match event {
            Event::ConfirmationRequired {
                session_id,
                output,
                timestamp_ms,
                ..
            } => {
                let mut guard = state.lock();
                let job_id = match guard.sessions.get(&session_id) {
                    Some(session) => {
                        let job_id = session.job_id.clone();
                        let pending = PendingConfirmation::new(
                            session_id.clone(),
                            job_id.clone(),
                            output.clone(),
                            timestamp_ms,
                        );
                        if guard.pending.insert(session_id.clone(), pending).is_some() {
                            tracing::warn!(%session_id, "pending confirmation overwritten");
                        }
                        job_id
                    }
                    None => None,
                };
                Event::ConfirmationRequired {
                    session_id,
                    job_id,
                    output,
                    timestamp_ms,
                }
            }
            Event::SessionEnded { ref session_id }
            | Event::SessionError { ref session_id, .. }
            | Event::SessionTerminated { ref session_id } => {
                let mut guard = state.lock();
                guard.sessions.remove(session_id);
                guard.pending.remove(session_id);
                drop(guard);
                event
            }
            other => other,
        };
        events.emit(event);
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
