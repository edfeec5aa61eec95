// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Registry: the authoritative in-memory map of sessions.
//!
//! Owned by the lifecycle manager and injected at construction. Sessions are
//! keyed by logical id with a secondary index from multiplexer handle to id,
//! so either form resolves without scanning. Mutators are crate-private: only
//! the manager and the monitors it owns change registry state.

use crate::error::ManagerError;
use ah_core::{epoch_ms, SessionId, SessionInfo};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Ownership link to a running confirmation monitor.
///
/// Dropping it (or sending on `shutdown`) stops the loop.
pub(crate) struct MonitorHandle {
    pub generation: u64,
    pub shutdown: oneshot::Sender<()>,
}

/// Confirmation bookkeeping used by the monitor to avoid re-raising.
#[derive(Debug, Default, Clone)]
pub(crate) struct ConfirmationState {
    pub pending: bool,
    pub last_raised: Option<String>,
}

impl ConfirmationState {
    /// A match raises only when nothing is pending and the screen changed
    /// since the last raise.
    pub fn should_raise(&self, output: &str) -> bool {
        !self.pending && self.last_raised.as_deref() != Some(output)
    }
}

pub(crate) struct SessionEntry {
    pub info: SessionInfo,
    pub monitor: Option<MonitorHandle>,
    pub confirmation: ConfirmationState,
}

impl SessionEntry {
    fn stop_monitor(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            let _ = monitor.shutdown.send(());
        }
    }
}

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<SessionId, SessionEntry>,
    by_handle: HashMap<String, SessionId>,
    creating: HashSet<SessionId>,
    next_generation: u64,
}

/// Shared session registry
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a logical id or a derived handle to the logical id.
    pub fn resolve(&self, key: &str) -> Option<SessionId> {
        let inner = self.inner.lock();
        resolve_locked(&inner, key)
    }

    /// Snapshot of one session, addressed by id or handle
    pub fn get(&self, key: &str) -> Option<SessionInfo> {
        let inner = self.inner.lock();
        let id = resolve_locked(&inner, key)?;
        inner.sessions.get(&id).map(|e| e.info.clone())
    }

    /// All registered sessions, oldest first
    pub fn list(&self) -> Vec<SessionInfo> {
        let inner = self.inner.lock();
        let mut sessions: Vec<SessionInfo> =
            inner.sessions.values().map(|e| e.info.clone()).collect();
        sessions.sort_by(|a, b| {
            a.created_at_ms
                .cmp(&b.created_at_ms)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        sessions
    }

    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a monitor loop is currently installed for `id`
    pub fn has_monitor(&self, id: &SessionId) -> bool {
        self.inner
            .lock()
            .sessions
            .get(id)
            .is_some_and(|e| e.monitor.is_some())
    }

    // -- crate-private mutators --

    /// Reserve `id` for creation.
    ///
    /// Fails if the id is active or already being created. An inactive
    /// leftover entry is evicted and returned so the caller can clean up
    /// its multiplexer session.
    pub(crate) fn begin_create(
        &self,
        id: &SessionId,
    ) -> Result<Option<SessionInfo>, ManagerError> {
        let mut inner = self.inner.lock();
        if inner.creating.contains(id) {
            return Err(ManagerError::AlreadyActive(id.clone()));
        }
        let leftover = match inner.sessions.get(id).map(|e| e.info.is_active) {
            Some(true) => return Err(ManagerError::AlreadyActive(id.clone())),
            Some(false) => remove_locked(&mut inner, id),
            None => None,
        };
        inner.creating.insert(id.clone());
        Ok(leftover)
    }

    pub(crate) fn abort_create(&self, id: &SessionId) {
        self.inner.lock().creating.remove(id);
    }

    /// Register a created session and release the reservation.
    pub(crate) fn finish_create(
        &self,
        id: SessionId,
        working_directory: PathBuf,
        resume_token: Option<String>,
    ) -> SessionInfo {
        let now = epoch_ms();
        let info = SessionInfo {
            handle: id.handle(),
            session_id: id.clone(),
            working_directory,
            resume_token,
            is_active: true,
            created_at_ms: now,
            last_activity_ms: now,
        };
        let mut inner = self.inner.lock();
        inner.creating.remove(&id);
        inner.by_handle.insert(info.handle.clone(), id.clone());
        inner.sessions.insert(
            id,
            SessionEntry {
                info: info.clone(),
                monitor: None,
                confirmation: ConfirmationState::default(),
            },
        );
        info
    }

    pub(crate) fn next_generation(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.next_generation += 1;
        inner.next_generation
    }

    /// Install a monitor, stopping any prior loop for the same session.
    ///
    /// Returns false (and stops the new loop) if the session is gone or
    /// inactive.
    pub(crate) fn install_monitor(&self, id: &SessionId, monitor: MonitorHandle) -> bool {
        let mut inner = self.inner.lock();
        match inner.sessions.get_mut(id) {
            Some(entry) if entry.info.is_active => {
                entry.stop_monitor();
                entry.monitor = Some(monitor);
                true
            }
            _ => {
                let _ = monitor.shutdown.send(());
                false
            }
        }
    }

    /// Run `f` on the entry only while it is still watched by monitor
    /// `generation`. Runs under the registry lock, so a concurrent removal
    /// either happens entirely before (and `f` is skipped) or after.
    pub(crate) fn with_monitored<R>(
        &self,
        id: &SessionId,
        generation: u64,
        f: impl FnOnce(&mut SessionEntry) -> R,
    ) -> Option<R> {
        let mut inner = self.inner.lock();
        let entry = inner.sessions.get_mut(id)?;
        match &entry.monitor {
            Some(m) if m.generation == generation => Some(f(entry)),
            _ => None,
        }
    }

    /// Run `f` on an entry addressed by logical id
    pub(crate) fn with_entry<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut SessionEntry) -> R,
    ) -> Option<R> {
        self.inner.lock().sessions.get_mut(id).map(f)
    }

    /// Monitor-driven teardown: the multiplexer session is gone.
    ///
    /// Removes the entry if `generation` still owns it; `on_removed` runs
    /// under the lock so its events cannot interleave with a concurrent
    /// terminate.
    pub(crate) fn end_monitored(
        &self,
        id: &SessionId,
        generation: u64,
        on_removed: impl FnOnce(&SessionInfo),
    ) -> bool {
        let mut inner = self.inner.lock();
        let owned = inner
            .sessions
            .get(id)
            .and_then(|e| e.monitor.as_ref())
            .is_some_and(|m| m.generation == generation);
        if !owned {
            return false;
        }
        if let Some(info) = remove_locked(&mut inner, id) {
            on_removed(&info);
        }
        true
    }

    /// Monitor-driven failure: keep the entry but mark it inactive with no
    /// monitor, so it rejects input until terminated or re-created.
    pub(crate) fn fail_monitored(
        &self,
        id: &SessionId,
        generation: u64,
        on_failed: impl FnOnce(&SessionInfo),
    ) -> bool {
        self.with_monitored(id, generation, |entry| {
            entry.info.is_active = false;
            entry.monitor = None;
            entry.confirmation = ConfirmationState::default();
            on_failed(&entry.info);
        })
        .is_some()
    }

    /// Remove a session, stopping its monitor.
    pub(crate) fn remove(&self, id: &SessionId) -> Option<SessionInfo> {
        let mut inner = self.inner.lock();
        remove_locked(&mut inner, id)
    }

    pub(crate) fn touch(&self, id: &SessionId) {
        if let Some(entry) = self.inner.lock().sessions.get_mut(id) {
            entry.info.last_activity_ms = epoch_ms();
        }
    }
}

fn resolve_locked(state: &RegistryState, key: &str) -> Option<SessionId> {
    if let Some((id, _)) = state.sessions.get_key_value(key) {
        return Some(id.clone());
    }
    state.by_handle.get(key).cloned()
}

fn remove_locked(state: &mut RegistryState, id: &SessionId) -> Option<SessionInfo> {
    let mut entry = state.sessions.remove(id)?;
    entry.stop_monitor();
    state.by_handle.remove(&entry.info.handle);
    entry.info.is_active = false;
    Some(entry.info)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
