//! `cwatch uninstall` - remove the hook, launch agent, and runtime files.

use anyhow::Result;
use cwatch_common::{EVENT_NOTIFICATION, EVENT_STOP, SettingsStore, deregister_hook, launchd, paths};
use std::path::PathBuf;
use tracing::{info, warn};

pub fn run(claude_dir: Option<PathBuf>, no_agent: bool) -> Result<()> {
    let claude_dir = super::resolve_claude_dir(claude_dir)?;
    let (hook_id, _) = super::hook_identity()?;

    let store = SettingsStore::for_claude_dir(&claude_dir);
    let mut settings = store.load()?;

    let mut changed = false;
    for event in [EVENT_STOP, EVENT_NOTIFICATION] {
        if deregister_hook(&mut settings, event, &hook_id)? {
            info!("deregistered {} hook", event);
            changed = true;
        } else {
            info!("no {} hook to remove", event);
        }
    }

    if changed {
        store.save(&settings)?;
        info!("updated {:?}", store.path());
    } else {
        info!("no hook entries found, settings left untouched");
    }

    if no_agent {
        info!("skipping launch agent (--no-agent)");
    } else {
        remove_agent();
    }

    cleanup_runtime_files();
    Ok(())
}

fn remove_agent() {
    if !cfg!(target_os = "macos") {
        info!("launchd is macOS-only, skipping launch agent");
        return;
    }

    let Some(plist_path) = paths::launch_agent_path(launchd::LAUNCH_AGENT_LABEL) else {
        warn!("could not determine home directory, leaving launch agent alone");
        return;
    };

    launchd::unload_agent(&plist_path);
    match std::fs::remove_file(&plist_path) {
        Ok(()) => info!("removed {:?}", plist_path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("no launch agent plist to remove");
        }
        Err(err) => warn!("could not remove {:?}: {}", plist_path, err),
    }
}

/// Remove the socket and daemon logs. The watcher config survives so a
/// reinstall keeps the user's alert preferences.
fn cleanup_runtime_files() {
    let mut targets = vec![PathBuf::from(paths::DEFAULT_SOCKET_PATH)];
    if let Some(path) = paths::daemon_stdout_log() {
        targets.push(path);
    }
    if let Some(path) = paths::daemon_stderr_log() {
        targets.push(path);
    }

    for path in targets {
        match std::fs::remove_file(&path) {
            Ok(()) => info!("removed {:?}", path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("could not remove {:?}: {}", path, err),
        }
    }
}
