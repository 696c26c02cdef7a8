//! `cwatch install` - register the hook and load the launch agent.

use anyhow::{Context, Result};
use cwatch_common::{
    DEFAULT_HOOK_TIMEOUT_SECS, EVENT_NOTIFICATION, EVENT_STOP, HookEntry, SettingsStore, launchd,
    paths, register_hook,
};
use std::path::PathBuf;
use tracing::info;

pub fn run(claude_dir: Option<PathBuf>, no_agent: bool) -> Result<()> {
    let claude_dir = super::resolve_claude_dir(claude_dir)?;
    let (hook_id, command) = super::hook_identity()?;
    let entry = HookEntry::command(command, DEFAULT_HOOK_TIMEOUT_SECS);

    let store = SettingsStore::for_claude_dir(&claude_dir);
    let mut settings = store.load()?;

    let mut changed = false;
    for event in [EVENT_STOP, EVENT_NOTIFICATION] {
        if register_hook(&mut settings, event, None, &entry, &hook_id)? {
            info!("registered {} hook", event);
            changed = true;
        } else {
            info!("{} hook already registered", event);
        }
    }

    if changed {
        store.save(&settings)?;
        info!("updated {:?}", store.path());
    } else {
        info!("hook configuration already current, settings left untouched");
    }

    if no_agent {
        info!("skipping launch agent (--no-agent)");
        return Ok(());
    }
    install_agent()
}

fn install_agent() -> Result<()> {
    if !cfg!(target_os = "macos") {
        info!("launchd is macOS-only, skipping launch agent");
        return Ok(());
    }

    let exe = std::env::current_exe().context("could not resolve the cwatch binary path")?;
    let daemon = exe.with_file_name("cwatchd");

    let state_dir = paths::claudewatch_dir().context("could not determine home directory")?;
    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("failed to create {state_dir:?}"))?;

    let stdout_log = paths::daemon_stdout_log().context("could not determine home directory")?;
    let stderr_log = paths::daemon_stderr_log().context("could not determine home directory")?;
    let plist_path = paths::launch_agent_path(launchd::LAUNCH_AGENT_LABEL)
        .context("could not determine home directory")?;

    let plist = launchd::render_agent_plist(&[daemon.display().to_string()], &stdout_log, &stderr_log);
    launchd::write_agent_plist(&plist_path, &plist)?;

    // Unload first so a running agent picks up the new descriptor.
    launchd::unload_agent(&plist_path);
    launchd::load_agent(&plist_path)?;
    info!("launch agent loaded from {:?}", plist_path);
    Ok(())
}
