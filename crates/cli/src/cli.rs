//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Radar Monitor - frame assembler for a four-radar obstacle constellation
#[derive(Parser, Debug)]
#[command(
    name = "radar-monitor",
    author,
    version,
    about = "Radar constellation frame monitor",
    long_about = "Assembles full-constellation obstacle frames from a telemetry stream.\n\n\
                  Reads decoded radar records (UDP, replay file or mock), rebuilds frames \n\
                  from per-sensor sweep sentinels, tracks altitude, and hands the newest \n\
                  frame to a renderer."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RADAR_MONITOR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RADAR_MONITOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the frame assembly pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

impl Cli {
    /// Prometheus port to expose; only a real `run` exports metrics
    pub fn metrics_port(&self) -> Option<u16> {
        match &self.command {
            Commands::Run(args) if args.metrics_port > 0 && !args.dry_run => {
                Some(args.metrics_port)
            }
            _ => None,
        }
    }
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "monitor.toml",
        env = "RADAR_MONITOR_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the telemetry source kind
    #[arg(long, value_enum, env = "RADAR_MONITOR_SOURCE")]
    pub source: Option<SourceArg>,

    /// Override the UDP bind host
    #[arg(long, env = "RADAR_MONITOR_HOST")]
    pub host: Option<String>,

    /// Override the UDP bind port
    #[arg(long, env = "RADAR_MONITOR_PORT")]
    pub port: Option<u16>,

    /// Replay a recorded JSON-lines file (implies --source replay)
    #[arg(long, env = "RADAR_MONITOR_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Maximum number of published frames (0 = unlimited)
    #[arg(long, default_value = "0", env = "RADAR_MONITOR_MAX_FRAMES")]
    pub max_frames: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "RADAR_MONITOR_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RADAR_MONITOR_METRICS_PORT")]
    pub metrics_port: u16,

    /// Write every rendered scene as a JSON line instead of logging it
    #[arg(long, env = "RADAR_MONITOR_SCENE_OUT")]
    pub scene_out: Option<PathBuf>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "monitor.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "monitor.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sensor mount geometry
    #[arg(long)]
    pub sensors: bool,
}

/// Telemetry source selectable from the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceArg {
    Udp,
    Replay,
    Mock,
}

impl From<SourceArg> for contracts::SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Udp => contracts::SourceKind::Udp,
            SourceArg::Replay => contracts::SourceKind::Replay,
            SourceArg::Mock => contracts::SourceKind::Mock,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
