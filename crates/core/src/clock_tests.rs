// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    zero = { 0, "0s" },
    seconds = { 59_000, "59s" },
    minutes = { 120_000, "2m" },
    whole_hour = { 3_600_000, "1h" },
    hour_and_minutes = { 5_400_000, "1h30m" },
    days = { 3 * 86_400_000, "3d" },
)]
fn format_age_buckets(elapsed_ms: u64, expected: &str) {
    let now = 10_000_000_000;
    assert_eq!(format_age(now - elapsed_ms, now), expected);
}

#[test]
fn format_age_clamps_future_timestamps() {
    assert_eq!(format_age(2_000, 1_000), "0s");
}

#[test]
fn epoch_ms_is_monotonic_enough() {
    let a = epoch_ms();
    let b = epoch_ms();
    assert!(b >= a);
    assert!(a > 1_600_000_000_000);
}
