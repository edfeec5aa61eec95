// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable, case-insensitive text pattern tables.
//!
//! The wrapped agent exposes no structured signals, so confirmation and
//! completion are inferred from rendered terminal text. Tables are data:
//! new agent output formats are added here without touching control flow.

use regex::{Regex, RegexBuilder};
use std::sync::{Arc, LazyLock};

/// Literal phrases meaning "the agent is asking to proceed/confirm/apply".
pub const CONFIRMATION_PHRASES: &[&str] = &[
    "Do you want to make this edit",
    "Do you want to proceed",
    "Continue with this edit",
    "Apply this change",
    "continue?",
    "[y/n]",
    "(y/n)",
];

/// Regexes meaning "the agent reports the task is finished".
pub const COMPLETION_PATTERNS: &[&str] = &[r"task completed", "✅", r"\bdone\b", r"\bfinished\b"];

static CONFIRMATION: LazyLock<Arc<PatternTable>> =
    LazyLock::new(|| Arc::new(PatternTable::from_literals(CONFIRMATION_PHRASES)));

static COMPLETION: LazyLock<Arc<PatternTable>> =
    LazyLock::new(|| Arc::new(PatternTable::compile_valid(COMPLETION_PATTERNS)));

/// An ordered set of case-insensitive patterns
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    patterns: Vec<(String, Regex)>,
}

impl PatternTable {
    /// Default confirmation table
    pub fn confirmation() -> Arc<Self> {
        Arc::clone(&CONFIRMATION)
    }

    /// Default completion table
    pub fn completion() -> Arc<Self> {
        Arc::clone(&COMPLETION)
    }

    /// Build from literal substrings (regex metacharacters are escaped).
    pub fn from_literals(phrases: &[&str]) -> Self {
        let mut table = Self::default();
        for phrase in phrases {
            if let Ok(re) = build(&regex::escape(phrase)) {
                table.patterns.push((phrase.to_string(), re));
            }
        }
        table
    }

    /// Build from regexes, failing on the first invalid one.
    pub fn from_regexes(patterns: &[&str]) -> Result<Self, regex::Error> {
        let mut table = Self::default();
        for pattern in patterns {
            table = table.with_regex(pattern)?;
        }
        Ok(table)
    }

    fn compile_valid(patterns: &[&str]) -> Self {
        let mut table = Self::default();
        for pattern in patterns {
            match build(pattern) {
                Ok(re) => table.patterns.push((pattern.to_string(), re)),
                Err(e) => tracing::error!(pattern, error = %e, "invalid built-in pattern"),
            }
        }
        table
    }

    /// Append a regex pattern
    pub fn with_regex(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let re = build(pattern)?;
        self.patterns.push((pattern.to_string(), re));
        Ok(self)
    }

    /// Append a literal phrase
    pub fn with_literal(self, phrase: &str) -> Self {
        let mut table = self;
        if let Ok(re) = build(&regex::escape(phrase)) {
            table.patterns.push((phrase.to_string(), re));
        }
        table
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|(_, re)| re.is_match(text))
    }

    /// Source of the first pattern that matches
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(source, _)| source.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn build(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
#[path = "patterns_tests.rs"]
mod tests;
