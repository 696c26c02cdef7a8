pub mod config;
pub mod install;
pub mod status;
pub mod uninstall;
pub mod usage;

use anyhow::{Context, Result};
use cwatch_common::{HookId, paths};
use std::path::PathBuf;

/// Claude configuration directory, honoring the CLI override.
pub(crate) fn resolve_claude_dir(claude_dir: Option<PathBuf>) -> Result<PathBuf> {
    claude_dir
        .or_else(paths::claude_dir)
        .context("could not determine home directory")
}

/// Identity and hook command derived from the installed binary.
pub(crate) fn hook_identity() -> Result<(HookId, String)> {
    let exe = std::env::current_exe().context("could not resolve the cwatch binary path")?;
    let id = HookId::from_path(&exe);
    let command = format!("{} hook", exe.display());
    Ok((id, command))
}
