//! Request handling specs against a live daemon
//!
//! None of these need tmux: they cover empty listings and errors for
//! unknown sessions and jobs.

use crate::prelude::*;

#[test]
fn empty_daemon_lists_nothing() {
    let mut temp = Project::empty();
    temp.daemon_start();

    temp.ah()
        .args(&["session", "list"])
        .passes()
        .stdout_eq("No sessions\n");
    temp.ah()
        .args(&["session", "list", "--tracked"])
        .passes()
        .stdout_eq("No sessions\n");
    temp.ah()
        .args(&["confirmations"])
        .passes()
        .stdout_eq("No pending confirmations\n");
    temp.ah()
        .args(&["job", "list"])
        .passes()
        .stdout_eq("No finished jobs\n");
}

#[test]
fn json_listing_is_an_array() {
    let mut temp = Project::empty();
    temp.daemon_start();

    let run = temp.ah().args(&["-o", "json", "session", "list"]).passes();
    let value: serde_json::Value = serde_json::from_str(&run.stdout()).unwrap();
    assert_eq!(value, serde_json::json!([]));
}

#[test]
fn output_for_unknown_session_fails() {
    let mut temp = Project::empty();
    temp.daemon_start();

    temp.ah()
        .args(&["session", "output", "nope"])
        .fails()
        .stderr_has("session not found: nope");
}

#[test]
fn confirm_without_pending_question_fails() {
    let mut temp = Project::empty();
    temp.daemon_start();

    temp.ah()
        .args(&["session", "confirm", "nope"])
        .fails()
        .stderr_has("nope");
}

#[test]
fn kill_unknown_session_is_not_an_error() {
    let mut temp = Project::empty();
    temp.daemon_start();

    temp.ah()
        .args(&["session", "kill", "nope"])
        .passes()
        .stdout_has("Session nope not found");
}

#[test]
fn cancel_unknown_job_fails() {
    let mut temp = Project::empty();
    temp.daemon_start();

    temp.ah()
        .args(&["job", "cancel", "ghost"])
        .fails()
        .stderr_has("ghost");
}
