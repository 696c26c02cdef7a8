//! `cwatch config` - show or change watcher alert settings.

use anyhow::{Context, Result};
use cwatch_common::{Volume, WatcherConfig, paths};
use tracing::info;

pub struct ConfigArgs {
    pub mute: bool,
    pub unmute: bool,
    pub sound: Option<bool>,
    pub notify: Option<bool>,
    pub volume: Option<String>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let path = paths::watcher_config_path().context("could not determine home directory")?;
    let mut config = WatcherConfig::load(&path);

    let mut changed = false;
    if args.mute {
        config.muted = true;
        changed = true;
    }
    if args.unmute {
        config.muted = false;
        changed = true;
    }
    if let Some(on) = args.sound {
        config.sound_enabled = on;
        changed = true;
    }
    if let Some(on) = args.notify {
        config.notify_enabled = on;
        changed = true;
    }
    if let Some(level) = args.volume {
        config.volume = match level.as_str() {
            "loud" => Volume::Loud,
            "medium" => Volume::Medium,
            "low" => Volume::Low,
            other => anyhow::bail!("unknown volume level: {other} (expected loud, medium, or low)"),
        };
        changed = true;
    }

    if changed {
        config.save(&path)?;
        info!("updated {:?}", path);
    }

    println!("sound:  {}", if config.sound_enabled { "on" } else { "off" });
    println!("notify: {}", if config.notify_enabled { "on" } else { "off" });
    println!("muted:  {}", if config.muted { "yes" } else { "no" });
    println!("volume: {}", config.volume);
    Ok(())
}
