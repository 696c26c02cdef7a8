//! Well-known filesystem locations for ClaudeWatch and Claude Code.

use std::path::PathBuf;

/// Unix socket the daemon listens on and the forwarder writes to.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/claudewatch.sock";

/// Gets the path to the .claude directory.
pub fn claude_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claude"))
}

/// ClaudeWatch's own state directory (~/.claudewatch).
pub fn claudewatch_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claudewatch"))
}

/// Watcher configuration file (~/.claudewatch/config.json).
pub fn watcher_config_path() -> Option<PathBuf> {
    claudewatch_dir().map(|d| d.join("config.json"))
}

/// Daemon stdout log under the state directory.
pub fn daemon_stdout_log() -> Option<PathBuf> {
    claudewatch_dir().map(|d| d.join("daemon.out.log"))
}

/// Daemon stderr log under the state directory.
pub fn daemon_stderr_log() -> Option<PathBuf> {
    claudewatch_dir().map(|d| d.join("daemon.err.log"))
}

/// Launch agent plist path (~/Library/LaunchAgents/<label>.plist).
pub fn launch_agent_path(label: &str) -> Option<PathBuf> {
    dirs::home_dir().map(|h| {
        h.join("Library")
            .join("LaunchAgents")
            .join(format!("{label}.plist"))
    })
}
