//! # Logging Utilities
//!
//! Logging infrastructure for Conduit using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Multiple output formats (JSON for production, pretty for development)
//! - Environment variable configuration
//! - File output next to (or instead of) the console
//!
//! Console output goes to stderr. The bridge is often hosted by a process whose
//! stdout is the RPC channel, and a stray log line there corrupts the stream.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use conduit_utils::init_logging;
//!
//! // Keep the guard alive for as long as logs should be flushed to the file.
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Bridge started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g., `RUST_LOG=debug`, `RUST_LOG=conduit_core=trace`)
//! - `CONDUIT_LOG_LEVEL`: Fixed level, overriding `RUST_LOG` (e.g., `debug`)
//! - `CONDUIT_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `CONDUIT_LOG_FILE`: Optional path of a daily-rolling log file

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "CONDUIT_LOG_FORMAT";
/// Environment variable selecting the default level.
pub const LOG_LEVEL_ENV: &str = "CONDUIT_LOG_LEVEL";
/// Environment variable naming the log file.
pub const LOG_FILE_ENV: &str = "CONDUIT_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    #[default]
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
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
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogSettings
{
    /// Output format for every sink.
    pub format: LogFormat,
    /// Fixed level. `None` defers to `RUST_LOG`, then info.
    pub level: Option<LogLevel>,
    /// Daily-rolling log file in addition to the console.
    pub file: Option<PathBuf>,
}

impl LogSettings
{
    /// Read settings from the process environment.
    ///
    /// ## Errors
    ///
    /// `InvalidFormat` / `InvalidLevel` for unparsable values.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// ## Errors
    ///
    /// `InvalidFormat` / `InvalidLevel` for unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup(LOG_FORMAT_ENV) {
            Some(value) => LogFormat::from_str(&value).map_err(LoggingError::InvalidFormat)?,
            None => LogFormat::default(),
        };
        let level = lookup(LOG_LEVEL_ENV)
            .map(|value| LogLevel::from_str(&value).map_err(LoggingError::InvalidLevel))
            .transpose()?;
        let file = lookup(LOG_FILE_ENV).filter(|path| !path.is_empty()).map(PathBuf::from);

        Ok(Self { format, level, file })
    }
}

/// Keeps the background file writer alive.
///
/// Buffered log lines are flushed when the guard is dropped, so hold it until
/// the process is about to exit.
#[derive(Debug)]
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - Invalid environment variable values
/// - The log file directory cannot be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with(&LogSettings::from_env()?)
}

/// Initialize logging with explicit level and format
///
/// `CONDUIT_LOG_FILE` is still honored.
///
/// ```rust,no_run
/// use conduit_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init_logging_with(&LogSettings {
        format,
        level: Some(level),
        file: env::var(LOG_FILE_ENV).ok().filter(|path| !path.is_empty()).map(PathBuf::from),
    })
}

/// Initialize logging from resolved settings
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with(settings: &LogSettings) -> Result<LoggingGuard, LoggingError>
{
    let filter = env_filter(settings.level);
    let mut layers: Vec<BoxedLayer> = vec![format_layer(settings.format, io::stderr, true)
        .with_filter(filter.clone())
        .boxed()];

    let mut guard = None;
    if let Some(path) = &settings.file {
        let (directory, file_name) = split_log_path(path)?;
        let appender = tracing_appender::rolling::daily(directory, file_name);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(format_layer(settings.format, writer, false).with_filter(filter).boxed());
        guard = Some(file_guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

/// Initialize logging to a file only, with nothing on stdout or stderr
///
/// For hosts that use both standard streams for the RPC channel. The log file
/// is `<log_dir>/YYYY-MM-DD-conduit-bridge.log`; the directory is created when
/// missing. Returns the file path.
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use conduit_utils::init_logging_file_only;
///
/// let (path, _guard) = init_logging_file_only(Path::new("/tmp/conduit"), None)
///     .expect("Failed to initialize file logging");
/// eprintln!("logging to {}", path.display());
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the directory cannot be
/// created.
pub fn init_logging_file_only(log_dir: &Path, level: Option<LogLevel>) -> Result<(PathBuf, LoggingGuard), LoggingError>
{
    fs::create_dir_all(log_dir)?;
    let file_name = log_file_name();
    let log_file = log_dir.join(&file_name);

    // The date is already in the name.
    let appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    Registry::default()
        .with(format_layer(LogFormat::Pretty, writer, false).with_filter(env_filter(level)))
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;

    Ok((log_file, LoggingGuard { _file: Some(guard) }))
}

/// Date-stamped name of the file-only log.
fn log_file_name() -> String
{
    format!("{}-conduit-bridge.log", Utc::now().format("%Y-%m-%d"))
}

/// Filter priority: explicit level, then `RUST_LOG`, then info.
fn env_filter(level: Option<LogLevel>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(Level::from(level).to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
    }
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339());

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).boxed(),
        LogFormat::Json => layer.json().with_current_span(true).with_span_list(true).boxed(),
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError>
{
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory)?;
    Ok((directory, PathBuf::from(file_name)))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// The log file path has no file name
    #[error("Invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
