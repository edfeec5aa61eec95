// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::session::{FakeSessionAdapter, SessionCall};
use serial_test::{parallel, serial};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}");
}

#[test]
#[serial(tracing)]
fn create_logs_span_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedSession::new(FakeSessionAdapter::new());
        traced.create("codeagent-x", Path::new("/tmp/proj")).await
    });

    assert!(result.is_ok(), "create should succeed: {:?}", result);
    assert_log(&logs, "span name", "session.create");
    assert_log(&logs, "handle", "codeagent-x");
    assert_log(&logs, "entry", "starting");
    assert_log(&logs, "completion", "session created");
    assert_log(&logs, "timing", "elapsed_ms");
}

#[test]
#[serial(tracing)]
fn create_failure_is_logged() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeSessionAdapter::new();
        fake.fail_create(true);
        TracedSession::new(fake)
            .create("codeagent-x", Path::new("/tmp"))
            .await
    });

    assert!(result.is_err());
    assert_log(&logs, "failure", "create failed");
}

#[test]
#[serial(tracing)]
fn send_logs_length_not_text() {
    let (logs, _) = with_tracing(|| async {
        let traced = TracedSession::new(FakeSessionAdapter::new());
        traced.create("h", Path::new("/tmp")).await.unwrap();
        traced.send_literal("h", "top secret prompt").await
    });

    assert_log(&logs, "send span", "session.send");
    assert_log(&logs, "input length", "input_len=17");
    assert!(!logs.contains("top secret"), "prompt text leaked:\n{logs}");
}

#[test]
#[serial(tracing)]
fn kill_of_missing_session_warns() {
    let (logs, result) = with_tracing(|| async {
        TracedSession::new(FakeSessionAdapter::new())
            .kill("nonexistent")
            .await
    });

    assert!(result.is_err());
    assert_log(&logs, "kill span", "session.kill");
    assert_log(&logs, "kill warning", "kill failed");
}

#[tokio::test]
#[parallel(tracing)]
async fn delegates_every_call_to_inner() {
    let fake = FakeSessionAdapter::new();
    let traced = TracedSession::new(fake.clone());

    traced.create("h", Path::new("/tmp")).await.unwrap();
    traced.send_key("h", "C-u").await.unwrap();
    traced.send_literal("h", "hi").await.unwrap();
    assert_eq!(traced.capture("h", 5).await.unwrap(), "hi");
    assert!(traced.exists("h").await.unwrap());
    traced.kill("h").await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 6);
    assert!(matches!(calls[5], SessionCall::Kill { .. }));
}
