// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_tables_compile_every_pattern() {
    assert_eq!(PatternTable::confirmation().len(), CONFIRMATION_PHRASES.len());
    assert_eq!(PatternTable::completion().len(), COMPLETION_PATTERNS.len());
}

#[yare::parameterized(
    edit_prompt = { "Continue with this edit? (y/n)" },
    make_edit = { "Do you want to make this edit to main.rs?" },
    proceed = { "│ Do you want to proceed?\n│ ❯ 1. Yes" },
    apply = { "APPLY THIS CHANGE" },
    bracket_yn = { "Overwrite file [Y/n]" },
    paren_yn = { "delete 3 files (Y/N)" },
    bare_continue = { "Tests failed. Continue?" },
)]
fn confirmation_matches(screen: &str) {
    assert!(PatternTable::confirmation().is_match(screen));
}

#[yare::parameterized(
    narration = { "I'll read the file and then update the function." },
    listing = { "src/\nCargo.toml\nREADME.md" },
    empty = { "" },
    partial_y = { "(y)" },
)]
fn confirmation_ignores_ordinary_output(screen: &str) {
    assert!(!PatternTable::confirmation().is_match(screen));
}

#[yare::parameterized(
    task_completed = { "Task completed successfully" },
    check_mark = { "✅ All tests pass" },
    done = { "Done." },
    finished = { "I have FINISHED the refactor" },
)]
fn completion_matches(text: &str) {
    assert!(PatternTable::completion().is_match(text));
}

#[yare::parameterized(
    undone = { "the change was undone" },
    abandoned = { "abandoned" },
    unfinished = { "unfinished business" },
    progress = { "working on it" },
)]
fn completion_requires_word_boundaries(text: &str) {
    assert!(!PatternTable::completion().is_match(text));
}

#[test]
fn first_match_reports_source_pattern() {
    let table = PatternTable::confirmation();
    assert_eq!(
        table.first_match("Apply this change? (y/n)"),
        Some("Apply this change")
    );
    assert_eq!(table.first_match("nothing here"), None);
}

#[test]
fn tables_are_extensible() {
    let table = PatternTable::from_literals(&["(y/n)"])
        .with_literal("Allow this tool?")
        .with_regex(r"press \d to confirm")
        .unwrap();
    assert!(table.is_match("allow this tool?"));
    assert!(table.is_match("Press 1 to confirm"));
    assert!(PatternTable::from_regexes(&["("]).is_err());
}
