//! CLI help output specs
//!
//! Verify help text displays for all commands.

use crate::prelude::*;

#[test]
fn ah_no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn ah_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("session")
        .stdout_has("prompt")
        .stdout_has("confirmations")
        .stdout_has("job")
        .stdout_has("watch")
        .stdout_has("daemon");
}

#[test]
fn ah_session_help_shows_subcommands() {
    cli()
        .args(&["session", "--help"])
        .passes()
        .stdout_has("create")
        .stdout_has("send")
        .stdout_has("output")
        .stdout_has("confirm")
        .stdout_has("mode")
        .stdout_has("kill")
        .stdout_has("list");
}

#[test]
fn ah_job_help_shows_subcommands() {
    cli()
        .args(&["job", "--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("cancel")
        .stdout_has("list");
}

#[test]
fn ah_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}

#[test]
fn ahd_version_shows_version() {
    let output = std::process::Command::new(ahd_binary())
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("ahd 0.1"));
}
