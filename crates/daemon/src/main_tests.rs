// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn startup_marker_appends_with_pid() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().join("nested"));

    write_startup_marker(&config).unwrap();
    write_startup_marker(&config).unwrap();

    let log = std::fs::read_to_string(&config.log_path).unwrap();
    let expected = format!("{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id());
    assert_eq!(log.lines().filter(|l| *l == expected).count(), 2);
}

#[test]
fn startup_error_is_written_to_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_state_dir(dir.path());

    write_startup_error(&config, &LifecycleError::NoStateDir);

    let log = std::fs::read_to_string(&config.log_path).unwrap();
    assert!(log.contains("ERROR Failed to start daemon: Could not determine state directory"));
}
