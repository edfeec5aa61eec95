//! Daemon lifecycle specs
//!
//! Verify start, ping, stop, and the single-instance lock.

use crate::prelude::*;

#[test]
fn daemon_ping_reports_version() {
    let mut temp = Project::empty();
    temp.daemon_start();

    temp.ah()
        .args(&["daemon", "ping"])
        .passes()
        .stdout_has("is running");
}

#[test]
fn daemon_stop_removes_socket_and_exits() {
    let mut temp = Project::empty();
    temp.daemon_start();

    temp.ah()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");

    assert!(!temp.socket_path().exists());
    assert!(temp.daemon_exited(), "ahd still running after stop");
    assert!(!temp.state_path().join("daemon.pid").exists());
}

#[test]
fn second_daemon_refuses_to_start() {
    let mut temp = Project::empty();
    temp.daemon_start();

    let output = temp.ahd_command().stderr(std::process::Stdio::piped()).output().unwrap();
    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("ahd is already running"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // The first daemon keeps serving
    temp.ah().args(&["daemon", "ping"]).passes();
}

#[test]
fn daemon_writes_startup_marker_to_log() {
    let mut temp = Project::empty();
    temp.daemon_start();
    assert!(temp.daemon_log().contains("--- ahd: starting (pid: "));
}
