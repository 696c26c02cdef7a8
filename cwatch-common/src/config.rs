//! Watcher settings persistence (~/.claudewatch/config.json).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Alert loudness presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volume {
    Loud,
    Medium,
    Low,
}

impl Default for Volume {
    fn default() -> Self {
        Self::Loud
    }
}

impl Volume {
    /// Numeric volume (0.0-1.0) passed to the sound player.
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Loud => 1.0,
            Self::Medium => 0.5,
            Self::Low => 0.2,
        }
    }
}

impl std::fmt::Display for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loud => write!(f, "loud"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Per-channel alert settings.
///
/// Missing keys fall back to defaults, unknown keys are ignored, and a
/// missing or corrupt file loads as all-defaults. The watcher must keep
/// alerting even when its config is damaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub sound_enabled: bool,
    pub notify_enabled: bool,
    pub muted: bool,
    pub volume: Volume,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notify_enabled: true,
            muted: false,
            volume: Volume::Loud,
        }
    }
}

impl WatcherConfig {
    /// Load config from disk, returning defaults for anything missing.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(err) => {
                    debug!("ignoring malformed watcher config at {:?}: {}", path, err);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist config to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {parent:?}"))?;
        }
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content).with_context(|| format!("failed to write {path:?}"))
    }
}
