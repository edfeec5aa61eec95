// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agenthub daemon (ahd)
//!
//! Owns the tmux-backed agent sessions and serves the `ah` CLI over a Unix
//! socket.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod listener;

use std::path::Path;
use std::sync::Arc;

use ah_adapters::{
    GitWorktreeAdapter, JsonlRecordStore, MultiplexerSetup, TmuxAdapter, TracedSession,
};
use ah_daemon::protocol::{DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use ah_engine::{
    InteractiveClient, JobRunner, JobRunnerConfig, ManagerConfig, SessionManager, SessionRegistry,
};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

use crate::lifecycle::{Config, LifecycleError, StartupResult};
use crate::listener::{DaemonCtx, Listener};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("ahd {}", PROTOCOL_VERSION);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("ahd {}", PROTOCOL_VERSION);
                println!("agenthub daemon - runs coding agents in tmux sessions");
                println!();
                println!("USAGE:");
                println!("    ahd");
                println!();
                println!("Listens on a Unix socket in the state directory for");
                println!("requests from `ah`.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: ahd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Marker goes in before tracing so a reader can find this attempt
    write_startup_marker(&config)?;
    let log_guard = setup_logging(&config)?;

    info!("Starting daemon");

    let StartupResult {
        mut daemon,
        listener: unix_listener,
    } = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("ahd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Tracing is non-blocking and may not flush before exit
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let sessions = TracedSession::new(TmuxAdapter::new());
    let manager = SessionManager::new(
        sessions,
        SessionRegistry::new(),
        Arc::new(MultiplexerSetup::homebrew()),
        ManagerConfig::from_env(),
    );
    let client = InteractiveClient::new(manager);
    let runner = JobRunner::new(
        client.clone(),
        JsonlRecordStore::new(&config.messages_path),
        JobRunnerConfig::from_env(),
    );

    let shutdown_notify = Arc::new(Notify::new());
    let ctx = Arc::new(DaemonCtx::new(
        client,
        runner,
        Arc::new(|root: &Path| GitWorktreeAdapter::new(root)),
        Arc::clone(&shutdown_notify),
        env::ipc_timeout().unwrap_or(DEFAULT_TIMEOUT),
    ));
    tokio::spawn(Listener::new(unix_listener, Arc::clone(&ctx)).run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );
    println!("READY");

    tokio::select! {
        _ = shutdown_notify.notified() => info!("Shutdown requested via command"),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    ctx.cleanup().await;
    daemon.shutdown()?;
    info!("Daemon stopped");
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- ahd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- ahd: starting (pid: ";

/// Append the startup marker to the log file
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
