//! ClaudeWatch CLI.
//!
//! Wires the notification hook into Claude Code's settings and the daemon
//! into launchd, and reports installation state and usage.

#![forbid(unsafe_code)]

mod commands;
mod hook;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cwatch_common::paths;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "cwatch")]
#[command(author, version, about = "ClaudeWatch - alerts & usage for Claude Code")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the notification hook and launch agent
    Install {
        /// Claude configuration directory (defaults to ~/.claude)
        #[arg(long)]
        claude_dir: Option<PathBuf>,

        /// Register the hook only, skipping the launch agent
        #[arg(long)]
        no_agent: bool,
    },
    /// Remove the notification hook, launch agent, and runtime files
    Uninstall {
        /// Claude configuration directory (defaults to ~/.claude)
        #[arg(long)]
        claude_dir: Option<PathBuf>,

        /// Remove the hook only, skipping the launch agent
        #[arg(long)]
        no_agent: bool,
    },
    /// Report hook, agent, and daemon state
    Status {
        /// Claude configuration directory (defaults to ~/.claude)
        #[arg(long)]
        claude_dir: Option<PathBuf>,
    },
    /// Show weekly and current-session usage
    Usage {
        /// Claude configuration directory (defaults to ~/.claude)
        #[arg(long)]
        claude_dir: Option<PathBuf>,
    },
    /// Show or change watcher alert settings
    Config {
        /// Mute all alerts
        #[arg(long, conflicts_with = "unmute")]
        mute: bool,

        /// Unmute alerts
        #[arg(long)]
        unmute: bool,

        /// Enable or disable the sound channel
        #[arg(long)]
        sound: Option<bool>,

        /// Enable or disable the notification banner channel
        #[arg(long)]
        notify: Option<bool>,

        /// Alert volume: loud, medium, or low
        #[arg(long)]
        volume: Option<String>,
    },
    /// Forward a hook event from stdin to the daemon (invoked by Claude Code)
    Hook {
        /// Path to the daemon socket
        #[arg(short, long, default_value = paths::DEFAULT_SOCKET_PATH)]
        socket: PathBuf,
    },
    /// Send a test alert through the daemon
    TestAlert {
        /// Path to the daemon socket
        #[arg(short, long, default_value = paths::DEFAULT_SOCKET_PATH)]
        socket: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logging goes to stderr: stdout belongs to the hook protocol.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Install { claude_dir, no_agent } => commands::install::run(claude_dir, no_agent),
        Commands::Uninstall { claude_dir, no_agent } => {
            commands::uninstall::run(claude_dir, no_agent)
        }
        Commands::Status { claude_dir } => commands::status::run(claude_dir),
        Commands::Usage { claude_dir } => commands::usage::run(claude_dir),
        Commands::Config {
            mute,
            unmute,
            sound,
            notify,
            volume,
        } => commands::config::run(commands::config::ConfigArgs {
            mute,
            unmute,
            sound,
            notify,
            volume,
        }),
        Commands::Hook { socket } => hook::run_hook(&socket).await,
        Commands::TestAlert { socket } => hook::send_test_alert(&socket).await,
    }
}
