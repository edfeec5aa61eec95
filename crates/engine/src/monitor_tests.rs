// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor behaviour, driven through the manager that owns the loops.

use crate::test_helpers::*;
use crate::ManagerError;
use ah_adapters::SessionCall;
use ah_core::{Event, SessionId};
use std::time::Duration;

const PROMPT: &str = "Edit src/main.rs\nContinue with this edit? (y/n)";

async fn create(ctx: &TestContext, id: &str) {
    ctx.manager
        .create_session(SessionId::new(id), ctx.project(), None)
        .await
        .unwrap();
}

fn is_confirmation(e: &Event) -> bool {
    matches!(e, Event::ConfirmationRequired { .. })
}

#[tokio::test(start_paused = true)]
async fn raises_confirmation_with_captured_text() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();

    ctx.sessions.set_output("codeagent-s", PROMPT);
    let event = wait_for(&mut sub, is_confirmation).await;

    match event {
        Event::ConfirmationRequired {
            session_id,
            job_id,
            output,
            timestamp_ms,
        } => {
            assert_eq!(session_id, "s");
            assert_eq!(job_id, None);
            assert_eq!(output, PROMPT);
            assert!(timestamp_ms > 0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn captures_only_the_last_few_lines() {
    let ctx = setup();
    create(&ctx, "s").await;
    tokio::time::sleep(Duration::from_millis(120)).await;

    let capture = ctx
        .sessions
        .calls()
        .into_iter()
        .find(|c| matches!(c, SessionCall::Capture { .. }));
    assert_eq!(
        capture,
        Some(SessionCall::Capture {
            handle: "codeagent-s".into(),
            lines: 5
        })
    );
}

#[tokio::test(start_paused = true)]
async fn pending_confirmation_is_not_raised_twice() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();

    ctx.sessions.set_output("codeagent-s", PROMPT);
    wait_for(&mut sub, is_confirmation).await;

    // A different prompt while the first is still pending
    ctx.sessions
        .set_output("codeagent-s", "Do you want to proceed? (y/n)");
    let later = drain_after(&mut sub, Duration::from_secs(1)).await;
    assert!(!later.iter().any(is_confirmation), "got {later:?}");
}

#[tokio::test(start_paused = true)]
async fn new_prompt_after_response_is_raised_again() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();

    ctx.sessions.set_output("codeagent-s", PROMPT);
    wait_for(&mut sub, is_confirmation).await;

    ctx.manager.respond_confirmation("s", true).await.unwrap();
    ctx.sessions.set_output("codeagent-s", "Applying edit...");
    let quiet = drain_after(&mut sub, Duration::from_millis(300)).await;
    assert!(!quiet.iter().any(is_confirmation));

    ctx.sessions
        .set_output("codeagent-s", "Do you want to proceed? (y/n)");
    let event = wait_for(&mut sub, is_confirmation).await;
    assert!(matches!(
        event,
        Event::ConfirmationRequired { output, .. } if output.contains("proceed")
    ));
}

#[tokio::test(start_paused = true)]
async fn identical_screen_after_response_is_not_re_raised() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();

    ctx.sessions.set_output("codeagent-s", PROMPT);
    wait_for(&mut sub, is_confirmation).await;
    ctx.manager.respond_confirmation("s", false).await.unwrap();
    ctx.sessions.set_output("codeagent-s", PROMPT);

    let later = drain_after(&mut sub, Duration::from_secs(1)).await;
    assert!(!later.iter().any(is_confirmation));
}

#[tokio::test(start_paused = true)]
async fn ordinary_output_raises_nothing() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();

    ctx.sessions
        .set_output("codeagent-s", "Reading files...\nUpdating the parser");
    let events = drain_after(&mut sub, Duration::from_secs(1)).await;
    assert!(events.is_empty(), "got {events:?}");
}

#[tokio::test(start_paused = true)]
async fn exited_session_is_ended_and_removed() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();

    ctx.sessions.set_exited("codeagent-s");
    let event = wait_for(&mut sub, |e| e.name() == "session:ended").await;

    assert_eq!(event.session_id(), Some(&SessionId::new("s")));
    assert!(ctx.manager.get_session("s").is_none());
    assert!(matches!(
        ctx.manager.send_command("s", "hi").await,
        Err(ManagerError::SessionNotFound(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn capture_failure_is_fatal_for_the_session() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();

    ctx.sessions.fail_capture("codeagent-s");
    let event = wait_for(&mut sub, |e| e.name() == "session:error").await;
    assert!(matches!(
        event,
        Event::SessionError { ref error, .. } if error.contains("capture-pane")
    ));

    let info = ctx.manager.get_session("s").unwrap();
    assert!(!info.is_active);
    assert!(!ctx.manager.registry().has_monitor(&SessionId::new("s")));
    assert!(matches!(
        ctx.manager.send_command("s", "hi").await,
        Err(ManagerError::SessionInactive(_))
    ));

    // No retries: the loop is gone
    let calls_before = ctx.sessions.calls().len();
    let later = drain_after(&mut sub, Duration::from_secs(1)).await;
    assert!(later.is_empty());
    assert_eq!(ctx.sessions.calls().len(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn errored_session_can_be_terminated_or_recreated() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();
    ctx.sessions.fail_capture("codeagent-s");
    wait_for(&mut sub, |e| e.name() == "session:error").await;

    create(&ctx, "s").await;
    assert!(ctx.manager.get_session("s").unwrap().is_active);
    assert!(ctx.manager.terminate_session("s").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn no_events_leak_after_terminate() {
    let ctx = setup();
    create(&ctx, "s").await;
    let mut sub = ctx.manager.subscribe();

    // Park a capture in flight, then tear the session down under it
    ctx.sessions.set_capture_delay(Duration::from_millis(200));
    ctx.sessions.set_output("codeagent-s", PROMPT);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(ctx
        .sessions
        .calls()
        .iter()
        .any(|c| matches!(c, SessionCall::Capture { .. })));

    ctx.manager.terminate_session("s").await.unwrap();
    let events = drain_after(&mut sub, Duration::from_secs(2)).await;

    assert_eq!(names(&events), vec!["session:terminated"]);
}

#[tokio::test(start_paused = true)]
async fn one_monitor_per_session() {
    let ctx = setup();
    create(&ctx, "a").await;
    create(&ctx, "b").await;
    ctx.sessions.clear_calls();

    tokio::time::sleep(Duration::from_millis(520)).await;

    let exists_a = ctx
        .sessions
        .calls()
        .iter()
        .filter(|c| matches!(c, SessionCall::Exists { handle } if handle == "codeagent-a"))
        .count();
    // 50ms interval over ~520ms
    assert!((9..=11).contains(&exists_a), "exists calls: {exists_a}");
}
