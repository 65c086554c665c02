//! # Logging Utilities
//!
//! `tracing` subscriber setup for hosts embedding the DIE attribute
//! interpreter.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dieview_utils::init_logging;
//!
//! // Reads RUST_LOG, DIEVIEW_LOG_FORMAT and DIEVIEW_LOG_FILE
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! The returned [`LoggingGuard`] flushes the file writer when dropped; keep
//! it alive for as long as the host runs.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: level filter (e.g. `RUST_LOG=debug`, `RUST_LOG=dieview_core=trace`)
//! - `DIEVIEW_LOG_FORMAT`: output format (`json` or `pretty`, default: `pretty`)
//! - `DIEVIEW_LOG_FILE`: optional log file, written in addition to stdout
//!
//! ## UI hosts
//!
//! A host that owns the terminal or a window must not log to stdout. It uses
//! [`init_file_logging`] instead:
//!
//! ```rust,no_run
//! use dieview_utils::{LogLevel, default_log_file, init_file_logging};
//!
//! let path = default_log_file();
//! let _guard = init_file_logging(&path, Some(LogLevel::Debug)).expect("Failed to initialize logging");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub const LOG_FORMAT_ENV: &str = "DIEVIEW_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "DIEVIEW_LOG_FILE";

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    Error,
    Warn,
    Info,
    Debug,
    /// Includes per-cell formatting decisions
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// What to log, where, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig
{
    pub format: LogFormat,
    /// Explicit level; `None` defers to `RUST_LOG`, then `info`
    pub level: Option<LogLevel>,
    /// Log file written in addition to (or instead of) stdout
    pub file: Option<PathBuf>,
    /// Whether to log to stdout
    pub console: bool,
}

impl LoggingConfig
{
    /// Console logging configured from `DIEVIEW_LOG_FORMAT` and `DIEVIEW_LOG_FILE`.
    pub fn from_env() -> Self
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`LoggingConfig::from_env`] with a custom variable lookup.
    ///
    /// Unknown format names fall back to pretty output.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self
    {
        let format = lookup(LOG_FORMAT_ENV)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let file = lookup(LOG_FILE_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        Self {
            format,
            level: None,
            file,
            console: true,
        }
    }
}

/// Keeps the non-blocking file writer alive; dropping it flushes the file.
#[derive(Debug, Default)]
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed or the log
/// file directory cannot be created.
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with(&LoggingConfig::from_env())
}

/// Initialize logging with explicit level and format, console only.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init_logging_with(&LoggingConfig {
        format,
        level: Some(level),
        file: None,
        console: true,
    })
}

/// Initialize file-only logging (nothing is written to stdout).
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed or the log
/// file directory cannot be created.
pub fn init_file_logging(path: &Path, level: Option<LogLevel>) -> Result<LoggingGuard, LoggingError>
{
    init_logging_with(&LoggingConfig {
        format: LogFormat::Pretty,
        level,
        file: Some(path.to_path_buf()),
        console: false,
    })
}

/// Install a global subscriber described by `config`.
///
/// ## Errors
///
/// `InitializationFailed` when a global subscriber is already installed,
/// `FileError` when the log file directory cannot be created.
pub fn init_logging_with(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut file_guard = None;

    if config.console {
        layers.push(output_layer(config.format, io::stdout, true));
    }

    if let Some(path) = &config.file {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory)?;
        let file_name = path.file_name().unwrap_or_default();
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&directory, file_name));
        layers.push(output_layer(config.format, writer, false));
        file_guard = Some(guard);
    }

    Registry::default()
        .with(env_filter(config.level))
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard { _file: file_guard })
}

/// `~/.dieview/YYYY-MM-DD-dieview.log`, or the same name in the temp dir when
/// `HOME` is not set.
pub fn default_log_file() -> PathBuf
{
    let name = format!("{}-dieview.log", Utc::now().format("%Y-%m-%d"));
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".dieview").join(name),
        None => env::temp_dir().join(name),
    }
}

/// Explicit level first, then `RUST_LOG`, then `info`.
fn env_filter(level: Option<LogLevel>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(Level::from(level).to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
    }
}

fn output_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(ansi)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    #[error("Invalid log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    #[error("Invalid log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// A global subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
