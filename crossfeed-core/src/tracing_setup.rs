//! Log output for the CLI and simulated sessions.
//!
//! The console shows what the user asked for; `crossfeed-last-run.log` keeps
//! every event of the last run so a misbehaving session can be replayed from
//! the cache and transition trace.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::CrossfeedError;

const LOG_FILE_NAME: &str = "crossfeed-last-run.log";
const DEFAULT_LOGS_DIR: &str = "logs";

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides `console_level` for the console only; the file under
/// `logs_dir` (default `./logs`) always records at trace level and is
/// truncated on every run.
///
/// # Errors
///
/// - `CrossfeedError::Io` - Logs directory or log file cannot be created
/// - `CrossfeedError::Configuration` - A global subscriber is already installed
pub fn init_tracing(console_level: Level, logs_dir: Option<&Path>) -> crate::Result<()> {
    let log_file_path = log_file_path(logs_dir);
    if let Some(parent) = log_file_path.parent() {
        create_dir_all(parent)?;
    }
    let log_file = File::create(&log_file_path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));
    let console_layer = fmt::layer()
        .with_target(true)
        .without_time()
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_filter(EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CrossfeedError::Configuration {
            reason: format!("tracing already initialized: {e}"),
        })?;

    tracing::info!(
        "Logging at {} to console, full trace in {}",
        console_level,
        log_file_path.display()
    );
    Ok(())
}

fn log_file_path(logs_dir: Option<&Path>) -> PathBuf {
    logs_dir
        .unwrap_or_else(|| Path::new(DEFAULT_LOGS_DIR))
        .join(LOG_FILE_NAME)
}

/// Console verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    Info,
    /// Cache hits, misses and evictions
    Debug,
    /// Dropped stale tickets and every time update
    Trace,
}

impl CliLogLevel {
    /// ```
    /// use crossfeed_core::tracing_setup::CliLogLevel;
    ///
    /// assert_eq!(CliLogLevel::Info.as_tracing_level(), tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::str::FromStr for CliLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true).map_err(|_| format!("Invalid log level: {s}"))
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{self:?}"),
        }
    }
}
