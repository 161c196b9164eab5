//! Command line interface for the `xymon-channel` binary.
//!
//! Every pipeline setting is optional; omitted settings keep the library
//! defaults.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

/// Log verbosity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// One line per decoded message.
    #[default]
    Info,
    /// Queue occupancy and rejected frames.
    Debug,
    /// Everything.
    Trace,
}

/// Command line arguments for the `xymon-channel` binary.
#[derive(Debug, Parser)]
#[command(
    name = "xymon-channel",
    version,
    about = "Decode a Xymon channel feed read from standard input"
)]
pub struct Cli {
    /// Capacity of the raw line queue [default: 10000].
    #[arg(long, value_name = "LINES")]
    pub line_queue: Option<usize>,

    /// Capacity of the decoded message queue [default: 100].
    #[arg(long, value_name = "MESSAGES")]
    pub message_queue: Option<usize>,

    /// Capacity of the error queue [default: 100].
    #[arg(long, value_name = "ERRORS")]
    pub error_queue: Option<usize>,

    /// Queue occupancy fraction that triggers a warning, in (0, 1]
    /// [default: 0.3].
    #[arg(long, value_name = "FRACTION")]
    pub warning_fraction: Option<f64>,

    /// Seconds between queue occupancy samples [default: 3].
    #[arg(long, value_name = "SECONDS")]
    pub monitor_interval: Option<u64>,

    /// Initial input buffer size in bytes [default: 32768].
    #[arg(long, value_name = "BYTES")]
    pub initial_line_buffer: Option<usize>,

    /// Longest accepted input line in bytes, at least 1024 [default: 2097152].
    #[arg(long, value_name = "BYTES")]
    pub max_line_length: Option<usize>,

    /// Frames decoded concurrently [default: 64].
    #[arg(long, value_name = "TASKS")]
    pub decode_concurrency: Option<usize>,

    /// Log verbosity.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Serve Prometheus metrics on this address.
    #[arg(long, value_name = "ADDR")]
    pub metrics_listen: Option<SocketAddr>,
}
