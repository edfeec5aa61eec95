// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ah watch` - Stream orchestration events

use ah_core::Event;
use anyhow::Result;
use clap::Args;

use crate::client::DaemonClient;
use crate::output::{first_line, OutputFormat};

#[derive(Args)]
pub struct WatchArgs {
    /// Only events for this session
    #[arg(long, short = 's')]
    pub session: Option<String>,
}

/// Print events until the daemon closes the stream or Ctrl-C.
pub async fn handle(args: WatchArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let mut stream = client.subscribe().await?;
    loop {
        tokio::select! {
            next = stream.next() => {
                let Some(event) = next? else {
                    break;
                };
                if !matches_filter(&event, args.session.as_deref()) {
                    continue;
                }
                match format {
                    OutputFormat::Text => println!("{}", format_event(&event)),
                    OutputFormat::Json => println!("{}", serde_json::to_string(&event)?),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                stream.unsubscribe().await?;
                break;
            }
        }
    }
    Ok(())
}

pub(crate) fn matches_filter(event: &Event, session: Option<&str>) -> bool {
    match session {
        None => true,
        Some(wanted) => event
            .session_id()
            .is_some_and(|id| id == wanted || id.handle() == wanted),
    }
}

/// One line per event; confirmations include the question
pub(crate) fn format_event(event: &Event) -> String {
    match event {
        Event::ConfirmationRequired { output, .. } => {
            let question = output
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("");
            format!("{} \"{}\"", event.log_summary(), first_line(question, 80))
        }
        _ => event.log_summary(),
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
