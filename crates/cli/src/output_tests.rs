// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn time_ago_of_zero_is_dash() {
    assert_eq!(format_time_ago(0), "-");
}

#[test]
fn time_ago_of_recent_timestamp_is_seconds() {
    let now = ah_core::epoch_ms();
    assert!(format_time_ago(now).ends_with('s'));
}

#[parameterized(
    short = { "hello", 10, "hello" },
    skips_blank_lines = { "\n  \nDo you want to proceed?\n(y/n)", 40, "Do you want to proceed?" },
    truncated = { "abcdefghijkl", 8, "abcde..." },
    empty = { "", 5, "" },
)]
fn first_line_cases(text: &str, max: usize, expected: &str) {
    assert_eq!(first_line(text, max), expected);
}
