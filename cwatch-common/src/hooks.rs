//! Idempotent hook registration for Claude Code settings.
//!
//! Claude Code stores hooks in `settings.json` under
//! `hooks.<EventName> -> [ { matcher?, hooks: [ {type, command, timeout} ] } ]`.
//! This module inserts and removes ClaudeWatch's entry in that subtree without
//! disturbing anything else in the document. Both operations are pure: they
//! mutate the in-memory document and report whether anything changed, and the
//! caller decides whether to persist.

use crate::errors::SettingsError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Event fired when a Claude Code response finishes.
pub const EVENT_STOP: &str = "Stop";

/// Event fired for permission prompts and other notifications.
pub const EVENT_NOTIFICATION: &str = "Notification";

/// Timeout written into installed hook entries, in seconds.
///
/// The forwarder's socket timeout is 3s, so 5s leaves headroom for process
/// startup without ever hitting Claude Code's own hook deadline.
pub const DEFAULT_HOOK_TIMEOUT_SECS: u64 = 5;

/// Identity of an installed hook: the absolute path of the hook binary.
///
/// The stored format has no foreign key, so recognition of "our" entry among
/// others works by substring containment of this path inside the stored
/// `command` string. That check lives in [`HookId::matches_command`] and is
/// applied only at the serialization boundary; everywhere else a `HookId`
/// compares by equality like any other value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookId(String);

impl HookId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a stored `command` string references this hook.
    pub fn matches_command(&self, command: &str) -> bool {
        command.contains(&self.0)
    }
}

impl std::fmt::Display for HookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One hook entry as Claude Code stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
    pub timeout: u64,
}

impl HookEntry {
    /// A `type: "command"` entry invoking `command` with the given timeout.
    pub fn command(command: impl Into<String>, timeout: u64) -> Self {
        Self {
            kind: "command".to_string(),
            command: command.into(),
            timeout,
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "type": self.kind,
            "command": self.command,
            "timeout": self.timeout,
        })
    }
}

/// Whether a hook group holds an entry referencing `id`.
fn group_references(group: &Value, id: &HookId) -> bool {
    if let Some(entries) = group.get("hooks").and_then(Value::as_array) {
        for entry in entries {
            if let Some(cmd) = entry.get("command").and_then(Value::as_str)
                && id.matches_command(cmd)
            {
                return true;
            }
        }
    }
    false
}

/// Whether `settings` already carries an entry for `id` under `event`.
pub fn hook_registered(settings: &Value, event: &str, id: &HookId) -> bool {
    settings
        .get("hooks")
        .and_then(|hooks| hooks.get(event))
        .and_then(Value::as_array)
        .is_some_and(|groups| groups.iter().any(|group| group_references(group, id)))
}

/// Ensure exactly one entry for `id` exists under `event`.
///
/// Missing subtrees (`hooks`, the event list) are created lazily. All
/// existing groups under the event are scanned, regardless of their matcher:
/// if any entry already references `id` the document is left untouched and
/// `Ok(false)` is returned, even when that entry sits under a different
/// matcher than requested. Otherwise a new group holding `entry` (tagged with
/// `matcher` when given) is appended to the end of the event's group list.
///
/// Returns `Ok(true)` iff the document was mutated.
pub fn register_hook(
    settings: &mut Value,
    event: &str,
    matcher: Option<&str>,
    entry: &HookEntry,
    id: &HookId,
) -> Result<bool, SettingsError> {
    let root = settings
        .as_object_mut()
        .ok_or(SettingsError::NotAnObject { context: "document" })?;

    let hooks = root
        .entry("hooks")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or(SettingsError::NotAnObject { context: "hooks" })?;

    let groups = hooks.entry(event).or_insert_with(|| json!([]));
    if !groups.is_array() {
        *groups = json!([]);
    }
    let groups = groups
        .as_array_mut()
        .ok_or(SettingsError::NotAnObject { context: "event list" })?;

    if groups.iter().any(|group| group_references(group, id)) {
        return Ok(false);
    }

    let group = match matcher {
        Some(tag) => json!({ "matcher": tag, "hooks": [entry.to_value()] }),
        None => json!({ "hooks": [entry.to_value()] }),
    };
    groups.push(group);
    Ok(true)
}

/// Remove every entry referencing `id` from `event`, pruning as it goes.
///
/// Groups left without entries are dropped, an event left without groups is
/// removed from `hooks`, and a `hooks` mapping left empty is removed from the
/// document. Relative order of everything that survives is preserved. A
/// document that never had the event (or whose subtree is not the expected
/// shape) is left untouched.
///
/// Returns `Ok(true)` iff at least one entry was removed.
pub fn deregister_hook(
    settings: &mut Value,
    event: &str,
    id: &HookId,
) -> Result<bool, SettingsError> {
    let Some(root) = settings.as_object_mut() else {
        return Ok(false);
    };

    let mut removed = false;
    {
        let Some(hooks) = root.get_mut("hooks").and_then(Value::as_object_mut) else {
            return Ok(false);
        };
        {
            let Some(groups) = hooks.get_mut(event).and_then(Value::as_array_mut) else {
                return Ok(false);
            };

            let kept: Vec<Value> = groups
                .drain(..)
                .filter_map(|mut group| {
                    let mut emptied = false;
                    if let Some(entries) = group.get_mut("hooks").and_then(Value::as_array_mut) {
                        let before = entries.len();
                        entries.retain(|entry| {
                            !entry
                                .get("command")
                                .and_then(Value::as_str)
                                .is_some_and(|cmd| id.matches_command(cmd))
                        });
                        if entries.len() != before {
                            removed = true;
                        }
                        emptied = entries.is_empty();
                    }
                    // Groups that are not the shape we own are left alone.
                    if emptied { None } else { Some(group) }
                })
                .collect();
            *groups = kept;
        }

        if hooks
            .get(event)
            .and_then(Value::as_array)
            .is_some_and(|groups| groups.is_empty())
        {
            hooks.shift_remove(event);
        }
    }

    if root
        .get("hooks")
        .and_then(Value::as_object)
        .is_some_and(|hooks| hooks.is_empty())
    {
        root.shift_remove("hooks");
    }

    Ok(removed)
}
