// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::{ManagerConfig, SessionManager, SessionRegistry, Subscription};
use ah_adapters::{FakeSessionAdapter, FakeToolchain, MultiplexerSetup};
use ah_core::Event;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub(crate) type TestManager = SessionManager<FakeSessionAdapter>;

/// Manager wired to fakes, with tight timings.
pub(crate) struct TestContext {
    pub sessions: FakeSessionAdapter,
    pub toolchain: FakeToolchain,
    pub manager: TestManager,
    pub dir: tempfile::TempDir,
}

impl TestContext {
    pub fn project(&self) -> &Path {
        self.dir.path()
    }
}

pub(crate) fn test_config() -> ManagerConfig {
    ManagerConfig {
        agent_command: "claude".to_string(),
        settle: Duration::from_millis(10),
        monitor_interval: Duration::from_millis(50),
        ..ManagerConfig::default()
    }
}

pub(crate) fn setup() -> TestContext {
    setup_with_toolchain(FakeToolchain::present())
}

pub(crate) fn setup_with_toolchain(toolchain: FakeToolchain) -> TestContext {
    let sessions = FakeSessionAdapter::new();
    let manager = SessionManager::new(
        sessions.clone(),
        SessionRegistry::new(),
        Arc::new(MultiplexerSetup::new(Arc::new(toolchain.clone()))),
        test_config(),
    );
    TestContext {
        sessions,
        toolchain,
        manager,
        dir: tempfile::tempdir().unwrap(),
    }
}

pub(crate) fn project_path(ctx: &TestContext) -> PathBuf {
    ctx.project().to_path_buf()
}

/// Wait (in paused time) for the first event matching `pred`.
pub(crate) async fn wait_for(sub: &mut Subscription, pred: impl Fn(&Event) -> bool) -> Event {
    let found = tokio::time::timeout(Duration::from_secs(30), async {
        while let Some(event) = sub.recv().await {
            if pred(&event) {
                return Some(event);
            }
        }
        None
    })
    .await;
    match found {
        Ok(Some(event)) => event,
        Ok(None) => panic!("event stream closed"),
        Err(_) => panic!("timed out waiting for event"),
    }
}

/// Let `duration` of (paused) time pass, then return everything received.
pub(crate) async fn drain_after(sub: &mut Subscription, duration: Duration) -> Vec<Event> {
    tokio::time::sleep(duration).await;
    let mut events = Vec::new();
    while let Some(event) = sub.try_recv() {
        events.push(event);
    }
    events
}

pub(crate) fn names(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(|e| e.name()).collect()
}
