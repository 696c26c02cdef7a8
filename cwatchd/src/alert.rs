//! Alert dispatch - system sound and user notification.

use cwatch_common::{HookEventPayload, WatcherConfig};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const BEEP_COUNT: u32 = 3;
const BEEP_GAP: Duration = Duration::from_millis(250);
const SOUND_PATH: &str = "/System/Library/Sounds/Ping.aiff";

/// Minimum spacing between alerts; a burst of hook events collapses into one.
const MIN_ALERT_INTERVAL: Duration = Duration::from_secs(2);

/// Rate limiter for alert dispatch.
pub struct AlertLimiter {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Default for AlertLimiter {
    fn default() -> Self {
        Self::new(MIN_ALERT_INTERVAL)
    }
}

impl AlertLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// Record an alert attempt. Returns false while still inside the window
    /// opened by the previous alert.
    pub fn try_fire(&self) -> bool {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        if last.is_some_and(|t| now.duration_since(t) < self.min_interval) {
            return false;
        }
        *last = Some(now);
        true
    }
}

/// Fire the alert honoring per-channel settings.
///
/// The sound loop runs on a background task so the connection handler
/// returns immediately.
pub fn fire_alert(config: &WatcherConfig, payload: &HookEventPayload) {
    if config.muted {
        debug!("muted, swallowing {} alert", payload.event_name());
        return;
    }

    if config.sound_enabled {
        let volume = config.volume.as_f32();
        tokio::spawn(async move {
            play_beeps(volume, BEEP_COUNT, BEEP_GAP).await;
        });
    }

    if config.notify_enabled {
        post_notification(payload);
    }
}

/// Play the system Ping sound `count` times with `gap` between plays.
async fn play_beeps(volume: f32, count: u32, gap: Duration) {
    for _ in 0..count {
        let status = tokio::process::Command::new("afplay")
            .arg("-v")
            .arg(volume.to_string())
            .arg(SOUND_PATH)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        if let Err(err) = status {
            warn!("could not play alert sound: {}", err);
            return;
        }
        tokio::time::sleep(gap).await;
    }
}

/// Text shown in the notification banner.
fn notification_body(payload: &HookEventPayload) -> String {
    if let Some(message) = &payload.message
        && !message.is_empty()
    {
        return message.clone();
    }
    match payload.event_name() {
        "Stop" => "Claude finished responding".to_string(),
        _ => "Claude needs your attention".to_string(),
    }
}

/// Escape a string for embedding in a double-quoted AppleScript literal.
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn post_notification(payload: &HookEventPayload) {
    let script = format!(
        "display notification \"{}\" with title \"ClaudeWatch\"",
        escape_applescript(&notification_body(payload))
    );
    tokio::spawn(async move {
        let status = tokio::process::Command::new("osascript")
            .arg("-e")
            .arg(script)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        if let Err(err) = status {
            warn!("could not post notification: {}", err);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> HookEventPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_limiter_allows_first_alert() {
        let limiter = AlertLimiter::new(Duration::from_secs(60));
        assert!(limiter.try_fire());
    }

    #[test]
    fn test_limiter_blocks_inside_window() {
        let limiter = AlertLimiter::new(Duration::from_secs(60));
        assert!(limiter.try_fire());
        assert!(!limiter.try_fire());
    }

    #[test]
    fn test_limiter_with_zero_interval_never_blocks() {
        let limiter = AlertLimiter::new(Duration::ZERO);
        assert!(limiter.try_fire());
        assert!(limiter.try_fire());
        assert!(limiter.try_fire());
    }

    #[test]
    fn test_notification_body_prefers_payload_message() {
        let p = payload(r#"{"hook_event_name": "Notification", "message": "needs permission"}"#);
        assert_eq!(notification_body(&p), "needs permission");
    }

    #[test]
    fn test_notification_body_for_stop_event() {
        let p = payload(r#"{"hook_event_name": "Stop"}"#);
        assert_eq!(notification_body(&p), "Claude finished responding");
    }

    #[test]
    fn test_notification_body_empty_message_falls_back() {
        let p = payload(r#"{"hook_event_name": "Notification", "message": ""}"#);
        assert_eq!(notification_body(&p), "Claude needs your attention");
    }

    #[test]
    fn test_escape_applescript() {
        assert_eq!(escape_applescript(r#"say "hi" \ bye"#), r#"say \"hi\" \\ bye"#);
    }
}
