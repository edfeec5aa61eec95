//! Session lifecycle specs against a real tmux server
//!
//! Skipped when tmux is not installed. The "agent" is a plain shell
//! command so no coding agent is needed.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ah_adapters::{FakeToolchain, MultiplexerSetup, SessionAdapter, TmuxAdapter};
use ah_core::{Event, SessionId};
use ah_engine::{ManagerConfig, SessionManager, SessionRegistry};
use serial_test::serial;

use crate::prelude::*;

fn unique_id(tag: &str) -> SessionId {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    SessionId::new(format!("spec-{}-{}-{}", tag, std::process::id(), nanos))
}

fn manager(agent_command: &str) -> SessionManager<TmuxAdapter> {
    let config = ManagerConfig {
        agent_command: agent_command.to_string(),
        settle: Duration::from_millis(200),
        monitor_interval: Duration::from_millis(100),
        ..ManagerConfig::default()
    };
    SessionManager::new(
        TmuxAdapter::new(),
        SessionRegistry::new(),
        Arc::new(MultiplexerSetup::new(Arc::new(FakeToolchain::present()))),
        config,
    )
}

async fn wait_for_output(
    manager: &SessionManager<TmuxAdapter>,
    key: &str,
    needle: &str,
) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(SPEC_WAIT_MAX_MS);
    while tokio::time::Instant::now() < deadline {
        if let Ok(output) = manager.get_output(key, 50).await {
            if output.contains(needle) {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

async fn next_matching(
    events: &mut ah_engine::Subscription,
    pred: impl Fn(&Event) -> bool,
) -> Option<Event> {
    tokio::time::timeout(Duration::from_millis(SPEC_WAIT_MAX_MS), async {
        while let Some(event) = events.recv().await {
            if pred(&event) {
                return Some(event);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

#[tokio::test]
#[serial(tmux)]
async fn create_send_capture_terminate() {
    if !tmux_available() {
        eprintln!("tmux not installed, skipping");
        return;
    }
    let project = Project::empty();
    let manager = manager("cat");
    let mut events = manager.subscribe();
    let id = unique_id("cat");

    manager
        .create_session(id.clone(), project.path(), None)
        .await
        .unwrap();
    let info = manager.get_session(id.as_str()).unwrap();
    assert!(info.is_active);
    assert_eq!(info.handle, id.handle());

    manager.send_command(id.as_str(), "list files").await.unwrap();
    assert!(
        wait_for_output(&manager, id.as_str(), "list files").await,
        "typed command never appeared in the pane"
    );

    // Handles resolve the same as ids
    assert!(manager.get_output(&id.handle(), 5).await.is_ok());

    assert!(manager.terminate_session(id.as_str()).await.unwrap());
    let terminated = next_matching(&mut events, |e| {
        matches!(e, Event::SessionTerminated { session_id } if *session_id == id)
    })
    .await;
    assert!(terminated.is_some(), "no terminated event");
    assert!(manager
        .list_sessions()
        .iter()
        .all(|s| s.session_id != id));

    // Second terminate is a no-op
    assert!(!manager.terminate_session(id.as_str()).await.unwrap());
}

#[tokio::test]
#[serial(tmux)]
async fn agent_exit_ends_session() {
    if !tmux_available() {
        eprintln!("tmux not installed, skipping");
        return;
    }
    let project = Project::empty();
    let manager = manager("exit");
    let mut events = manager.subscribe();
    let id = unique_id("exit");

    manager
        .create_session(id.clone(), project.path(), None)
        .await
        .unwrap();

    let ended = next_matching(&mut events, |e| {
        matches!(e, Event::SessionEnded { session_id } if *session_id == id)
    })
    .await;
    assert!(ended.is_some(), "monitor never noticed the exit");
    assert!(!manager.get_session(id.as_str()).map(|s| s.is_active).unwrap_or(false));

    manager.cleanup().await;
}

fn tmux_kill_exact(handle: &str) {
    let status = std::process::Command::new("tmux")
        .args(["kill-session", "-t", &format!("={}", handle)])
        .status()
        .unwrap();
    assert!(status.success());
}

#[tokio::test]
#[serial(tmux)]
async fn ids_sharing_a_prefix_stay_independent() {
    if !tmux_available() {
        eprintln!("tmux not installed, skipping");
        return;
    }
    let project = Project::empty();
    let manager = manager("cat");
    let mut events = manager.subscribe();
    let base = unique_id("pfx");
    let short = SessionId::new(format!("{}-1", base));
    let long = SessionId::new(format!("{}-10", base));

    for id in [&short, &long] {
        manager
            .create_session(id.clone(), project.path(), None)
            .await
            .unwrap();
    }

    // The short one dying is noticed even though the long one still matches
    // its name as a prefix
    tmux_kill_exact(&short.handle());
    let ended = next_matching(&mut events, |e| {
        matches!(e, Event::SessionEnded { session_id } if *session_id == short)
    })
    .await;
    assert!(ended.is_some(), "exit of {} went unnoticed", short);
    assert!(manager.get_session(long.as_str()).unwrap().is_active);

    // Terminating the short one never touches the long one
    manager
        .create_session(short.clone(), project.path(), None)
        .await
        .unwrap();
    assert!(manager.terminate_session(short.as_str()).await.unwrap());
    let adapter = TmuxAdapter::new();
    assert!(adapter.exists(&long.handle()).await.unwrap());
    assert!(manager.get_output(long.as_str(), 5).await.is_ok());

    manager.cleanup().await;
    assert!(!adapter.exists(&long.handle()).await.unwrap());
}
