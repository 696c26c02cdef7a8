//! ClaudeWatch daemon.
//!
//! Listens on a Unix socket for hook events forwarded by `cwatch hook` and
//! turns them into alerts. Kept alive by launchd; also runnable by hand with
//! `cwatchd --verbose`.

#![forbid(unsafe_code)]

mod alert;

use alert::AlertLimiter;
use anyhow::{Context, Result};
use clap::Parser;
use cwatch_common::{HookEventPayload, WatcherConfig, paths};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Same payload cap the forwarder applies on its stdin.
const MAX_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "cwatchd")]
#[command(author, version, about = "ClaudeWatch daemon - alert dispatch for Claude Code hooks")]
struct Cli {
    /// Path to Unix socket
    #[arg(short, long, default_value = paths::DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Path to watcher configuration (defaults to ~/.claudewatch/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Shared daemon state passed to all connection handlers.
#[derive(Clone)]
struct DaemonContext {
    /// Watcher config location, re-read per event so toggles apply live.
    config_path: Option<PathBuf>,
    /// Alert rate limiter.
    limiter: Arc<AlertLimiter>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Starting ClaudeWatch daemon...");

    let config_path = cli.config.or_else(paths::watcher_config_path);
    if let Some(ref path) = config_path {
        info!("Watcher config at {:?}", path);
    } else {
        warn!("Could not determine config path, using defaults");
    }

    // Remove a stale socket from a previous run
    if cli.socket.exists() {
        std::fs::remove_file(&cli.socket)
            .with_context(|| format!("failed to remove stale socket {:?}", cli.socket))?;
    }

    let listener = UnixListener::bind(&cli.socket)
        .with_context(|| format!("failed to bind {:?}", cli.socket))?;
    info!("Listening on {:?}", cli.socket);

    let context = DaemonContext {
        config_path,
        limiter: Arc::new(AlertLimiter::default()),
    };

    // Remove the socket on ctrl-c so restarts start clean
    let socket_path = cli.socket.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            let _ = std::fs::remove_file(&socket_path);
            std::process::exit(0);
        }
    });

    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let ctx = context.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, ctx).await {
                        warn!("Connection error: {}", e);
                    }
                });
            }
            Err(e) => {
                warn!("Accept error: {}", e);
            }
        }
    }
}

/// Drain one forwarded payload and fire the alert if it checks out.
async fn handle_connection(stream: UnixStream, context: DaemonContext) -> Result<()> {
    let mut raw = Vec::new();
    stream
        .take(MAX_PAYLOAD_BYTES)
        .read_to_end(&mut raw)
        .await
        .context("failed to read payload")?;

    if raw.is_empty() {
        return Ok(());
    }

    let payload: HookEventPayload = match serde_json::from_slice(&raw) {
        Ok(payload) => payload,
        Err(err) => {
            debug!("ignoring malformed payload: {}", err);
            return Ok(());
        }
    };
    info!("received {} event", payload.event_name());

    if !context.limiter.try_fire() {
        debug!("alert suppressed by rate limit");
        return Ok(());
    }

    let config = match &context.config_path {
        Some(path) => WatcherConfig::load(path),
        None => WatcherConfig::default(),
    };
    alert::fire_alert(&config, &payload);
    Ok(())
}
