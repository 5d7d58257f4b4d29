//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "blindctl", version, about = "Blind controller CLI")]
pub struct Cli {
    /// Path to config TOML; built-in defaults apply when the file is absent
    #[arg(long, value_name = "FILE", default_value = "etc/blind_config.toml")]
    pub config: PathBuf,

    /// Override the state file path from the config
    #[arg(long, value_name = "FILE")]
    pub store_path: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop (buttons + persisted state) until interrupted
    Run {
        /// Tick cadence in ms (defaults to input.poll_ms from the config)
        #[arg(long, value_name = "MS")]
        tick_ms: Option<u64>,
    },
    /// Move to a target position (percent closed, 0 = open) and wait
    Move {
        /// Target position, 0..=100 percent closed
        #[arg(long)]
        position: f64,
    },
    /// Print position, state and travel timing
    Status,
    /// Update travel timing; rejected unless fully open or fully closed
    Timing {
        /// Seconds of full travel toward open
        #[arg(long, value_name = "SECS")]
        seconds_to_open: Option<f64>,
        /// Seconds of full travel toward close
        #[arg(long, value_name = "SECS")]
        seconds_to_close: Option<f64>,
    },
    /// Quick health check (hardware presence / sim ok)
    SelfCheck,
}
