//! Claude Code hook event payloads.
//!
//! Claude Code pipes a JSON object to the hook's stdin when an event fires.
//! The forwarder relays the raw bytes to the daemon unmodified; this type
//! exists so both sides can sanity-check the payload and log the event name
//! without caring about fields we do not use.

use serde::Deserialize;

/// Event payload delivered to a hook on stdin.
#[derive(Debug, Clone, Deserialize)]
pub struct HookEventPayload {
    /// Which event fired (e.g. "Stop", "Notification").
    #[serde(default)]
    pub hook_event_name: Option<String>,
    /// Session the event belongs to.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Human-readable message for Notification events.
    #[serde(default)]
    pub message: Option<String>,
}

impl HookEventPayload {
    /// Event name for logging, with a placeholder for payloads that omit it.
    pub fn event_name(&self) -> &str {
        self.hook_event_name.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stop_event() {
        let json = r#"{
            "session_id": "abc123",
            "transcript_path": "/tmp/transcript.jsonl",
            "hook_event_name": "Stop"
        }"#;

        let payload: HookEventPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.event_name(), "Stop");
        assert_eq!(payload.session_id.as_deref(), Some("abc123"));
        assert!(payload.message.is_none());
    }

    #[test]
    fn test_parse_notification_event_with_message() {
        let json = r#"{
            "hook_event_name": "Notification",
            "message": "Claude needs your permission to use Bash"
        }"#;

        let payload: HookEventPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.event_name(), "Notification");
        assert!(payload.message.as_deref().unwrap().contains("permission"));
    }

    #[test]
    fn test_parse_minimal_payload() {
        let payload: HookEventPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.event_name(), "unknown");
    }
}
