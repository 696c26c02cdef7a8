//! Launch agent descriptor generation and launchctl wrappers.
//!
//! The daemon is kept alive by launchd on macOS. Install renders the agent
//! plist under ~/Library/LaunchAgents and loads it; uninstall unloads and
//! deletes it. On other platforms callers skip these steps entirely.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Reverse-DNS label for the launch agent.
pub const LAUNCH_AGENT_LABEL: &str = "com.claudewatch.agent";

/// Render the launch agent property list.
///
/// `program_args` is the argv launchd should spawn (binary first). Daemon
/// output is redirected to the given log files.
pub fn render_agent_plist(program_args: &[String], stdout_log: &Path, stderr_log: &Path) -> String {
    let args_xml: String = program_args
        .iter()
        .map(|arg| format!("        <string>{arg}</string>\n"))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{LAUNCH_AGENT_LABEL}</string>
    <key>ProgramArguments</key>
    <array>
{args_xml}    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <true/>
    <key>StandardOutPath</key>
    <string>{}</string>
    <key>StandardErrorPath</key>
    <string>{}</string>
</dict>
</plist>
"#,
        stdout_log.display(),
        stderr_log.display()
    )
}

/// Write the plist to disk, creating the LaunchAgents directory if needed.
pub fn write_agent_plist(plist_path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = plist_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {parent:?}"))?;
    }
    fs::write(plist_path, contents).with_context(|| format!("failed to write {plist_path:?}"))
}

/// Load the agent via launchctl.
pub fn load_agent(plist_path: &Path) -> Result<()> {
    let status = Command::new("launchctl")
        .arg("load")
        .arg(plist_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("failed to run launchctl load")?;
    if !status.success() {
        anyhow::bail!("launchctl load exited with {status}");
    }
    Ok(())
}

/// Unload the agent via launchctl, tolerating an agent that was never
/// loaded. Returns whether launchctl reported success.
pub fn unload_agent(plist_path: &Path) -> bool {
    match Command::new("launchctl")
        .arg("unload")
        .arg(plist_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => {
            debug!("launchctl unload {:?}: {}", plist_path, status);
            status.success()
        }
        Err(err) => {
            warn!("failed to run launchctl unload: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_agent_plist_contains_program_and_logs() {
        let args = vec!["/opt/cwatch/bin/cwatchd".to_string(), "--verbose".to_string()];
        let plist = render_agent_plist(
            &args,
            &PathBuf::from("/home/u/.claudewatch/daemon.out.log"),
            &PathBuf::from("/home/u/.claudewatch/daemon.err.log"),
        );

        assert!(plist.contains("<string>com.claudewatch.agent</string>"));
        assert!(plist.contains("<string>/opt/cwatch/bin/cwatchd</string>"));
        assert!(plist.contains("<string>--verbose</string>"));
        assert!(plist.contains("<key>RunAtLoad</key>"));
        assert!(plist.contains("<key>KeepAlive</key>"));
        assert!(plist.contains("daemon.out.log"));
        assert!(plist.contains("daemon.err.log"));
    }

    #[test]
    fn test_write_agent_plist_creates_parent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("LaunchAgents").join("test.plist");

        write_agent_plist(&path, "<plist/>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<plist/>");
    }
}
