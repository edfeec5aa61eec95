// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Confirmation Monitor: one polling loop per active session.
//!
//! Each tick checks that the multiplexer session still exists, captures the
//! last few lines, and raises `session:confirmation_required` when the
//! confirmation table matches. A failed tick is fatal for the session: the
//! loop stops, the session is deactivated, and `session:error` is the only
//! signal. Nothing here is retried.
//!
//! Every registry write and event emission goes through the registry's
//! generation check under its lock, so once a session is removed (or a newer
//! monitor installed) this loop can no longer publish anything.

use crate::event_bus::EventBus;
use crate::patterns::PatternTable;
use crate::registry::{MonitorHandle, SessionRegistry};
use ah_adapters::{SessionAdapter, SessionError};
use ah_core::{epoch_ms, Event, SessionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::Instrument;

/// Everything a monitor loop needs
pub(crate) struct MonitorContext<S> {
    pub sessions: S,
    pub registry: SessionRegistry,
    pub events: EventBus,
    pub patterns: Arc<PatternTable>,
    pub interval: Duration,
    pub lines: u32,
}

enum Tick {
    Continue,
    Stop,
}

/// Spawn a monitor for `session_id` and return its ownership handle.
///
/// The caller installs the handle into the registry; until then (or if
/// installation fails) the loop's generation owns nothing and it exits on
/// its first tick.
pub(crate) fn start_monitor<S: SessionAdapter>(
    ctx: MonitorContext<S>,
    session_id: SessionId,
) -> MonitorHandle {
    let generation = ctx.registry.next_generation();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let span = tracing::info_span!("monitor", session_id = %session_id, generation);
    tokio::spawn(run(ctx, session_id, generation, shutdown_rx).instrument(span));
    MonitorHandle {
        generation,
        shutdown: shutdown_tx,
    }
}

async fn run<S: SessionAdapter>(
    ctx: MonitorContext<S>,
    session_id: SessionId,
    generation: u64,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let handle = session_id.handle();
    let mut interval = tokio::time::interval(ctx.interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // First tick completes immediately; skip it so the agent gets one
    // interval to render before the first capture.
    interval.tick().await;
    tracing::debug!("monitor started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Tick::Stop = tick(&ctx, &session_id, &handle, generation).await {
                    break;
                }
            }
            _ = &mut shutdown_rx => {
                tracing::debug!("monitor shutdown requested");
                break;
            }
        }
    }
    tracing::debug!("monitor stopped");
}

async fn tick<S: SessionAdapter>(
    ctx: &MonitorContext<S>,
    session_id: &SessionId,
    handle: &str,
    generation: u64,
) -> Tick {
    match ctx.sessions.exists(handle).await {
        Ok(true) => {}
        Ok(false) => {
            ctx.registry.end_monitored(session_id, generation, |_| {
                tracing::info!(%session_id, "multiplexer session ended");
                ctx.events.emit(Event::SessionEnded {
                    session_id: session_id.clone(),
                });
            });
            return Tick::Stop;
        }
        Err(e) => {
            fail(ctx, session_id, generation, &e);
            return Tick::Stop;
        }
    }

    let output = match ctx.sessions.capture(handle, ctx.lines).await {
        Ok(output) => output,
        Err(e) => {
            fail(ctx, session_id, generation, &e);
            return Tick::Stop;
        }
    };

    if !ctx.patterns.is_match(&output) {
        return match ctx.registry.with_monitored(session_id, generation, |_| ()) {
            Some(()) => Tick::Continue,
            None => Tick::Stop,
        };
    }

    let raised = ctx
        .registry
        .with_monitored(session_id, generation, |entry| {
            if !entry.confirmation.should_raise(&output) {
                return false;
            }
            entry.confirmation.pending = true;
            entry.confirmation.last_raised = Some(output.clone());
            ctx.events.emit(Event::ConfirmationRequired {
                session_id: session_id.clone(),
                job_id: None,
                output: output.clone(),
                timestamp_ms: epoch_ms(),
            });
            true
        });

    match raised {
        Some(true) => {
            tracing::info!(
                %session_id,
                pattern = ctx.patterns.first_match(&output).unwrap_or(""),
                "confirmation required"
            );
            Tick::Continue
        }
        Some(false) => Tick::Continue,
        None => Tick::Stop,
    }
}

fn fail<S>(ctx: &MonitorContext<S>, session_id: &SessionId, generation: u64, e: &SessionError) {
    ctx.registry.fail_monitored(session_id, generation, |_| {
        tracing::error!(%session_id, error = %e, "monitor tick failed, deactivating session");
        ctx.events.emit(Event::SessionError {
            session_id: session_id.clone(),
            error: e.to_string(),
        });
    });
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
