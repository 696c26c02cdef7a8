//! Hook event forwarder.
//!
//! Invoked by Claude Code on Stop and Notification events. Reads the event
//! JSON from stdin and relays the raw bytes to the daemon socket. The
//! forwarder must never block or fail the host application: every failure
//! path is a silent success, and the socket work finishes well under the
//! hook's 5-second deadline.

use anyhow::{Context, Result};
use cwatch_common::HookEventPayload;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// Socket budget, under the hook entry's 5-second timeout.
const SOCKET_TIMEOUT: Duration = Duration::from_secs(3);

/// Stdin cap to prevent OOM on runaway input.
const MAX_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Run the forwarder: stdin to daemon socket, errors swallowed.
pub async fn run_hook(socket: &Path) -> Result<()> {
    let mut input = String::new();
    {
        use tokio::io::{AsyncReadExt, stdin};
        if stdin()
            .take(MAX_PAYLOAD_BYTES)
            .read_to_string(&mut input)
            .await
            .is_err()
        {
            return Ok(());
        }
    }

    let input = input.trim();
    if input.is_empty() {
        return Ok(());
    }

    let payload: HookEventPayload = match serde_json::from_str(input) {
        Ok(payload) => payload,
        Err(err) => {
            debug!("dropping malformed hook input: {}", err);
            return Ok(());
        }
    };
    debug!("forwarding {} event", payload.event_name());

    if let Err(err) = forward(socket, input.as_bytes()).await {
        debug!("could not reach daemon at {:?}: {}", socket, err);
    }
    Ok(())
}

/// Write a payload to the daemon socket within the timeout budget.
async fn forward(socket: &Path, payload: &[u8]) -> std::io::Result<()> {
    let send = async {
        let mut stream = UnixStream::connect(socket).await?;
        stream.write_all(payload).await?;
        stream.shutdown().await
    };
    match timeout(SOCKET_TIMEOUT, send).await {
        Ok(result) => result,
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timed out talking to daemon",
        )),
    }
}

/// Send a synthetic event so the user can hear what an alert will be like.
/// Unlike the forwarder this surfaces failures, since it is run by hand.
pub async fn send_test_alert(socket: &Path) -> Result<()> {
    let payload = serde_json::json!({
        "hook_event_name": "TestAlert",
        "message": "ClaudeWatch test alert",
    })
    .to_string();

    forward(socket, payload.as_bytes())
        .await
        .with_context(|| format!("daemon not reachable at {socket:?} - is cwatchd running?"))?;
    info!("test alert sent");
    Ok(())
}
