//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "irrigate", version, about = "Irrigation session controller")]
pub struct Cli {
    /// Path to config TOML; built-in defaults (sim backend) when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and logs as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one irrigation session; Ctrl-C stops it early
    Start {
        /// Target volume in liters
        #[arg(long, value_name = "L")]
        liters: f64,
        /// Use this predicted volume instead of asking the recommendation service
        #[arg(long, value_name = "L")]
        predicted: Option<f64>,
    },
    /// Show field conditions and the current water recommendation
    Predict,
    /// Show recent irrigation history
    History,
    /// Validate the config and backend setup
    SelfCheck,
}
