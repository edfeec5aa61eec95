// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Lifecycle Manager.
//!
//! Translates logical session operations into multiplexer commands, owns the
//! registry, and starts one confirmation monitor per created session.
//! Operations accept either the logical id or the derived handle.

use crate::env;
use crate::error::ManagerError;
use crate::event_bus::{EventBus, Subscription};
use crate::monitor::{start_monitor, MonitorContext};
use crate::patterns::PatternTable;
use crate::registry::SessionRegistry;
use ah_adapters::{keys, MultiplexerSetup, SessionAdapter};
use ah_core::{Event, SessionId, SessionInfo};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Pause between clearing the line and typing
const CLEAR_DELAY: Duration = Duration::from_millis(25);
/// Pause between keystroke phases so the agent can render
const KEY_DELAY: Duration = Duration::from_millis(100);

/// Lines captured per monitor tick
pub const MONITOR_CAPTURE_LINES: u32 = 5;

/// Lifecycle manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Command typed into a new session to launch the agent
    pub agent_command: String,
    /// Delay between creating a session and launching the agent
    pub settle: Duration,
    pub monitor_interval: Duration,
    pub monitor_lines: u32,
    pub confirmation_patterns: Arc<PatternTable>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            agent_command: "claude".to_string(),
            settle: Duration::from_millis(500),
            monitor_interval: Duration::from_millis(500),
            monitor_lines: MONITOR_CAPTURE_LINES,
            confirmation_patterns: PatternTable::confirmation(),
        }
    }
}

impl ManagerConfig {
    pub fn from_env() -> Self {
        Self {
            agent_command: env::agent_command(),
            settle: env::settle_ms(),
            monitor_interval: env::monitor_poll_ms(),
            ..Self::default()
        }
    }

    /// Launch line: `<agent>` or `<agent> --resume <token>`
    pub fn launch_command(&self, resume_token: Option<&str>) -> String {
        match resume_token {
            Some(token) if !token.trim().is_empty() => {
                format!("{} --resume {}", self.agent_command, token.trim())
            }
            _ => self.agent_command.clone(),
        }
    }
}

/// Session lifecycle manager
pub struct SessionManager<S: SessionAdapter> {
    sessions: S,
    registry: SessionRegistry,
    events: EventBus,
    setup: Arc<MultiplexerSetup>,
    config: ManagerConfig,
}

impl<S: SessionAdapter> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            registry: self.registry.clone(),
            events: self.events.clone(),
            setup: Arc::clone(&self.setup),
            config: self.config.clone(),
        }
    }
}

impl<S: SessionAdapter> SessionManager<S> {
    pub fn new(
        sessions: S,
        registry: SessionRegistry,
        setup: Arc<MultiplexerSetup>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            sessions,
            registry,
            events: EventBus::new(),
            setup,
            config,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    /// Resolve an id or handle to the logical id
    pub fn resolve(&self, key: &str) -> Option<SessionId> {
        self.registry.resolve(key)
    }

    /// Create a multiplexer session in `working_directory`, launch the agent
    /// in it, register it, and start its monitor.
    ///
    /// On failure nothing stays registered and any half-created multiplexer
    /// session is killed.
    pub async fn create_session(
        &self,
        session_id: SessionId,
        working_directory: &Path,
        resume_token: Option<&str>,
    ) -> Result<SessionId, ManagerError> {
        validate_session_id(&session_id)?;
        if let Some(token) = resume_token {
            validate_resume_token(token)?;
        }
        self.setup.ensure().await?;

        if let Some(leftover) = self.registry.begin_create(&session_id)? {
            tracing::info!(%session_id, "replacing inactive session");
            if let Err(e) = self.sessions.kill(&leftover.handle).await {
                tracing::debug!(%session_id, error = %e, "leftover kill failed");
            }
        }

        let handle = session_id.handle();
        if let Err(source) = self.launch(&handle, working_directory, resume_token).await {
            self.registry.abort_create(&session_id);
            return Err(ManagerError::SessionCreation { session_id, source });
        }

        let info = self.registry.finish_create(
            session_id.clone(),
            working_directory.to_path_buf(),
            resume_token.map(String::from),
        );
        let monitor = start_monitor(self.monitor_context(), session_id.clone());
        self.registry.install_monitor(&session_id, monitor);

        tracing::info!(%session_id, handle, cwd = %working_directory.display(), "session created");
        self.events.emit(Event::SessionCreated {
            session_id: session_id.clone(),
            handle: info.handle,
            working_directory: info.working_directory,
        });
        Ok(session_id)
    }

    async fn launch(
        &self,
        handle: &str,
        working_directory: &Path,
        resume_token: Option<&str>,
    ) -> Result<(), ah_adapters::SessionError> {
        self.sessions.create(handle, working_directory).await?;
        tokio::time::sleep(self.config.settle).await;

        let launch = self.config.launch_command(resume_token);
        let sent = async {
            self.sessions.send_literal(handle, &launch).await?;
            self.sessions.send_key(handle, keys::SUBMIT).await
        }
        .await;
        if let Err(e) = sent {
            if let Err(kill_err) = self.sessions.kill(handle).await {
                tracing::warn!(handle, error = %kill_err, "cleanup after failed launch");
            }
            return Err(e);
        }
        Ok(())
    }

    fn monitor_context(&self) -> MonitorContext<S> {
        MonitorContext {
            sessions: self.sessions.clone(),
            registry: self.registry.clone(),
            events: self.events.clone(),
            patterns: Arc::clone(&self.config.confirmation_patterns),
            interval: self.config.monitor_interval,
            lines: self.config.monitor_lines,
        }
    }

    /// Resolve `key` to an active session: (logical id, handle)
    fn active(&self, key: &str) -> Result<(SessionId, String), ManagerError> {
        let info = self
            .registry
            .get(key)
            .ok_or_else(|| ManagerError::SessionNotFound(key.to_string()))?;
        if !info.is_active {
            return Err(ManagerError::SessionInactive(info.session_id));
        }
        Ok((info.session_id, info.handle))
    }

    /// Type `text` and submit it.
    ///
    /// Clears any partially typed line first, then submits twice: the agent
    /// does not reliably start on a single Enter. A failure here never
    /// deactivates the session.
    pub async fn send_command(&self, key: &str, text: &str) -> Result<(), ManagerError> {
        let (session_id, handle) = self.active(key)?;

        self.sessions.send_key(&handle, keys::CLEAR_LINE).await?;
        tokio::time::sleep(CLEAR_DELAY).await;
        self.sessions.send_literal(&handle, text).await?;
        tokio::time::sleep(KEY_DELAY).await;
        self.sessions.send_key(&handle, keys::SUBMIT).await?;
        tokio::time::sleep(KEY_DELAY).await;
        self.sessions.send_key(&handle, keys::SUBMIT).await?;

        self.registry.touch(&session_id);
        tracing::debug!(%session_id, len = text.len(), "command sent");
        self.events.emit(Event::CommandSent {
            session_id,
            command: text.to_string(),
        });
        Ok(())
    }

    /// Rotate the agent's operating mode (interactive, auto-accept, plan).
    pub async fn cycle_modes(&self, key: &str) -> Result<(), ManagerError> {
        let (session_id, handle) = self.active(key)?;

        self.sessions.send_key(&handle, keys::CANCEL).await?;
        tokio::time::sleep(KEY_DELAY).await;
        self.sessions.send_key(&handle, keys::CLEAR_LINE).await?;
        tokio::time::sleep(KEY_DELAY).await;
        self.sessions.send_key(&handle, keys::CYCLE_MODE).await?;

        self.registry.touch(&session_id);
        self.events.emit(Event::ModeChanged { session_id });
        Ok(())
    }

    /// Last `lines` rendered lines, trailing whitespace trimmed.
    pub async fn get_output(&self, key: &str, lines: u32) -> Result<String, ManagerError> {
        let (_, handle) = self.active(key)?;
        let output = self.sessions.capture(&handle, lines).await?;
        Ok(output.trim_end().to_string())
    }

    /// Answer a confirmation with `y` or `n`.
    pub async fn respond_confirmation(&self, key: &str, approve: bool) -> Result<(), ManagerError> {
        let answer = if approve { "y" } else { "n" };
        self.send_command(key, answer).await?;

        if let Some(session_id) = self.registry.resolve(key) {
            self.registry.with_entry(&session_id, |entry| {
                entry.confirmation.pending = false;
            });
            self.events.emit(Event::ConfirmationResponded {
                session_id,
                approved: approve,
            });
        }
        Ok(())
    }

    /// Kill and forget a session. Unknown ids are a no-op.
    ///
    /// Returns whether a session was terminated. The entry is removed (and
    /// its monitor stopped) before the kill, so a concurrent second call
    /// finds nothing and emits nothing.
    pub async fn terminate_session(&self, key: &str) -> Result<bool, ManagerError> {
        let Some(session_id) = self.registry.resolve(key) else {
            tracing::debug!(key, "terminate: no such session");
            return Ok(false);
        };
        let Some(info) = self.registry.remove(&session_id) else {
            return Ok(false);
        };

        if let Err(e) = self.sessions.kill(&info.handle).await {
            tracing::warn!(%session_id, error = %e, "kill failed (session may already be gone)");
        }
        tracing::info!(%session_id, "session terminated");
        self.events.emit(Event::SessionTerminated { session_id });
        Ok(true)
    }

    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        self.registry.list()
    }

    pub fn get_session(&self, key: &str) -> Option<SessionInfo> {
        self.registry.get(key)
    }

    /// Terminate every session, then announce `system:cleanup_complete`.
    pub async fn cleanup(&self) {
        for info in self.registry.list() {
            if let Err(e) = self.terminate_session(info.session_id.as_str()).await {
                tracing::warn!(session_id = %info.session_id, error = %e, "cleanup terminate failed");
            }
        }
        tracing::info!("session manager cleanup complete");
        self.events.emit(Event::CleanupComplete);
    }
}

/// The id becomes part of a tmux target, where `.` and `:` separate
/// window and pane.
pub(crate) fn validate_session_id(session_id: &SessionId) -> Result<(), ManagerError> {
    let id = session_id.as_str();
    if id.is_empty() || id.chars().any(|c| c == '.' || c == ':' || c.is_whitespace()) {
        return Err(ManagerError::InvalidSessionId(id.to_string()));
    }
    Ok(())
}

/// The token is typed into a shell. Blank tokens are ignored.
pub(crate) fn validate_resume_token(token: &str) -> Result<(), ManagerError> {
    let token = token.trim();
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if !token.chars().all(allowed) {
        return Err(ManagerError::InvalidResumeToken(token.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
