//! Command-line interface for voxlate
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Live speech translation from the microphone
#[derive(Parser, Debug)]
#[command(
    name = "voxlate",
    version,
    about = "Live speech translation from the microphone"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: session status, -vv: effective configuration)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Source language (name or code, e.g. english, en)
    #[arg(long, short = 's', value_name = "LANG")]
    pub source: Option<String>,

    /// Target language (name or code, e.g. spanish, es)
    #[arg(long, short = 't', value_name = "LANG")]
    pub target: Option<String>,

    /// Audio input device (substring match, see `voxlate devices`)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// How long to wait for speech each pass. Examples: 5s, 500ms, 1m
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_secs)]
    pub timeout: Option<u64>,

    /// Maximum utterance length. Examples: 10s, 30s, 1m
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_secs)]
    pub phrase_limit: Option<u64>,

    /// Translate one utterance and exit (default: keep translating)
    #[arg(long)]
    pub once: bool,

    /// Print translations instead of speaking them
    #[arg(long)]
    pub no_playback: bool,

    /// Show a placeholder when translation fails instead of dropping the pass
    #[arg(long)]
    pub placeholder_on_error: bool,
}

/// Parse a duration string into seconds.
///
/// Supports any format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`), and compound (`1m30s`).
fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported languages
    Languages,

    /// List available audio input devices
    Devices,

    /// Start the daemon (foreground process for systemd)
    Daemon {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/voxlate.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Start translating via IPC
    Start {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/voxlate.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Stop translating via IPC
    Stop {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/voxlate.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Toggle translation on/off via IPC
    Toggle {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/voxlate.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Get daemon status via IPC
    Status {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/voxlate.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Change the daemon's language pair via IPC
    SetLanguages {
        /// Source language (name or code)
        source: String,

        /// Target language (name or code)
        target: String,

        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/voxlate.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Ask the daemon to exit via IPC
    Shutdown {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/voxlate.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
}
