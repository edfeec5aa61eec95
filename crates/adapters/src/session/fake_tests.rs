// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn create_records_call_and_session() {
    let adapter = FakeSessionAdapter::new();
    adapter
        .create("codeagent-a", Path::new("/tmp/proj"))
        .await
        .unwrap();

    assert_eq!(
        adapter.calls(),
        vec![SessionCall::Create {
            handle: "codeagent-a".into(),
            cwd: PathBuf::from("/tmp/proj"),
        }]
    );
    assert!(adapter.exists("codeagent-a").await.unwrap());
}

#[tokio::test]
async fn literal_text_is_echoed_to_screen() {
    let adapter = FakeSessionAdapter::new();
    adapter.create("h", Path::new("/tmp")).await.unwrap();
    adapter.send_literal("h", "list files").await.unwrap();
    assert_eq!(adapter.capture("h", 5).await.unwrap(), "list files");
}

#[tokio::test]
async fn capture_returns_last_lines() {
    let adapter = FakeSessionAdapter::new();
    adapter.create("h", Path::new("/tmp")).await.unwrap();
    adapter.set_output("h", "1\n2\n3\n4");
    assert_eq!(adapter.capture("h", 2).await.unwrap(), "3\n4");
}

#[tokio::test]
async fn exited_session_is_absent_and_rejects_input() {
    let adapter = FakeSessionAdapter::new();
    adapter.create("h", Path::new("/tmp")).await.unwrap();
    adapter.set_exited("h");

    assert!(!adapter.exists("h").await.unwrap());
    assert!(matches!(
        adapter.send_key("h", "Enter").await,
        Err(SessionError::NotFound(_))
    ));
    assert!(adapter.kill("h").await.is_err());
}

#[tokio::test]
async fn injected_failures() {
    let adapter = FakeSessionAdapter::new();
    adapter.fail_create(true);
    assert!(adapter.create("h", Path::new("/tmp")).await.is_err());
    adapter.fail_create(false);
    adapter.create("h", Path::new("/tmp")).await.unwrap();

    adapter.fail_capture("h");
    assert!(adapter.exists("h").await.unwrap());
    assert!(adapter.capture("h", 5).await.is_err());

    adapter.fail_sends(true);
    assert!(adapter.send_literal("h", "x").await.is_err());
}

#[tokio::test]
async fn inputs_filters_by_handle() {
    let adapter = FakeSessionAdapter::new();
    adapter.create("a", Path::new("/tmp")).await.unwrap();
    adapter.create("b", Path::new("/tmp")).await.unwrap();
    adapter.send_key("a", "C-u").await.unwrap();
    adapter.send_literal("b", "hi").await.unwrap();

    assert_eq!(
        adapter.inputs("a"),
        vec![SessionCall::SendKey {
            handle: "a".into(),
            key: "C-u".into()
        }]
    );
}
