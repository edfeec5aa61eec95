//! CLI error handling specs

use crate::prelude::*;

#[test]
fn session_list_without_daemon_reports_not_running() {
    let temp = Project::empty();
    temp.ah()
        .args(&["session", "list"])
        .fails()
        .stderr_has("Error: Daemon not running");
}

#[test]
fn confirmations_without_daemon_reports_not_running() {
    let temp = Project::empty();
    temp.ah()
        .args(&["confirmations"])
        .fails()
        .stderr_has("Daemon not running");
}

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["frobnicate"]).fails().stderr_has("unrecognized subcommand");
}

#[test]
fn confirm_requires_session_id() {
    cli().args(&["session", "confirm"]).fails().stderr_has("<ID>");
}

#[test]
fn output_format_must_be_known() {
    cli()
        .args(&["-o", "yaml", "session", "list"])
        .fails()
        .stderr_has("invalid value 'yaml'");
}
