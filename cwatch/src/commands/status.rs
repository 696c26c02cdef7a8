//! `cwatch status` - report hook, agent, and daemon state.

use anyhow::Result;
use cwatch_common::{EVENT_NOTIFICATION, EVENT_STOP, SettingsStore, hook_registered, launchd, paths};
use std::path::{Path, PathBuf};

pub fn run(claude_dir: Option<PathBuf>) -> Result<()> {
    let claude_dir = super::resolve_claude_dir(claude_dir)?;
    let (hook_id, _) = super::hook_identity()?;

    let store = SettingsStore::for_claude_dir(&claude_dir);
    let settings = store.load()?;

    println!("settings: {}", store.path().display());
    for event in [EVENT_STOP, EVENT_NOTIFICATION] {
        let state = if hook_registered(&settings, event, &hook_id) {
            "registered"
        } else {
            "not registered"
        };
        println!("  {event} hook: {state}");
    }

    if cfg!(target_os = "macos") {
        let state = paths::launch_agent_path(launchd::LAUNCH_AGENT_LABEL)
            .filter(|p| p.exists())
            .map_or("not installed", |_| "installed");
        println!("launch agent: {state}");
    } else {
        println!("launch agent: unavailable on this platform");
    }

    let socket_state = if Path::new(paths::DEFAULT_SOCKET_PATH).exists() {
        "present"
    } else {
        "absent"
    };
    println!("daemon socket: {socket_state} ({})", paths::DEFAULT_SOCKET_PATH);

    Ok(())
}
