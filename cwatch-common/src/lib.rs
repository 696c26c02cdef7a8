//! Shared types and utilities for ClaudeWatch.
//!
//! ClaudeWatch wires a notification daemon into Claude Code: the `cwatch`
//! CLI registers a hook command in Claude Code's settings and a launch agent
//! for the daemon, and `cwatchd` turns forwarded hook events into alerts.
//! This crate holds everything both binaries share: the idempotent hook
//! merge, the settings store, the watcher config, the IPC payload types,
//! launch agent plumbing, and usage-stats parsing.

pub mod config;
pub mod errors;
pub mod hooks;
pub mod launchd;
pub mod paths;
pub mod protocol;
pub mod settings;
pub mod usage;

pub use config::{Volume, WatcherConfig};
pub use errors::SettingsError;
pub use hooks::{
    DEFAULT_HOOK_TIMEOUT_SECS, EVENT_NOTIFICATION, EVENT_STOP, HookEntry, HookId, deregister_hook,
    hook_registered, register_hook,
};
pub use protocol::HookEventPayload;
pub use settings::SettingsStore;
