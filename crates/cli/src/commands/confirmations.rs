// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ah confirmations` - List confirmations waiting for an answer

use std::io::Write;

use ah_core::PendingConfirmation;
use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{first_line, format_time_ago, print_json, OutputFormat};
use crate::table::{Column, Table};

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let pending = client.pending_confirmations().await?;
    match format {
        OutputFormat::Text if pending.is_empty() => println!("No pending confirmations"),
        OutputFormat::Text => format_confirmations(&mut std::io::stdout(), &pending),
        OutputFormat::Json => print_json(&pending)?,
    }
    Ok(())
}

/// One row per pending confirmation; the prompt column shows the question line
pub(crate) fn format_confirmations(w: &mut impl Write, pending: &[PendingConfirmation]) {
    let mut table = Table::new(vec![
        Column::new("SESSION").with_max(36),
        Column::new("JOB").with_max(36),
        Column::new("AGE"),
        Column::new("PROMPT"),
    ]);
    for p in pending {
        table.row(vec![
            p.session_id.to_string(),
            p.job_id
                .as_ref()
                .map(|j| j.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format_time_ago(p.timestamp_ms),
            question_line(&p.output),
        ]);
    }
    table.render(w);
}

/// The last non-blank line usually holds the question itself
fn question_line(output: &str) -> String {
    let last = output
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");
    first_line(last, 60)
}

#[cfg(test)]
#[path = "confirmations_tests.rs"]
mod tests;
