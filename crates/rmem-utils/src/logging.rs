//! # Logging Utilities
//!
//! Logging setup for programs built on `rmem-core`, using `tracing`.
//!
//! `rmem-core` only emits events: `trace!` for every native transfer and
//! pointer chain step, `debug!` when process handles are opened or released.
//! Nothing is printed unless the application installs a subscriber, which is
//! what this module does:
//!
//! - Pretty (development) or JSON (production) output
//! - Filtering through `RUST_LOG` directives
//! - Optional mirroring to a log file through a non-blocking appender
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rmem_utils::init_logging;
//!
//! // Keep the guard alive for as long as events should reach the log file
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: filter directives (e.g. `RUST_LOG=debug`, `RUST_LOG=rmem_core=trace`)
//! - `RMEM_LOG_FORMAT`: output format (`json` or `pretty`, default: `pretty`)
//! - `RMEM_LOG_FILE`: optional log file. If it names an existing directory, a
//!   dated `YYYY-MM-DD-rmem.log` file is created inside it.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use rmem_utils::{LogFormat, LogLevel, init_logging_with_level};
//!
//! // Trace every transfer, in JSON
//! let _guard = init_logging_with_level(LogLevel::Trace, LogFormat::Json)
//!     .expect("Failed to initialize logging");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use chrono::Local;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const FORMAT_VAR: &str = "RMEM_LOG_FORMAT";

/// Environment variable naming the log file
pub const FILE_VAR: &str = "RMEM_LOG_FILE";

/// Environment variable holding filter directives
pub const FILTER_VAR: &str = "RUST_LOG";

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
    /// Debug level: handle acquisition and release
    Debug,
    /// Trace level: every transfer
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

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig
{
    /// Output format
    pub format: LogFormat,
    /// Level used when no filter directives are given
    pub level: LogLevel,
    /// `RUST_LOG`-style directives; take precedence over `level`
    pub directives: Option<String>,
    /// Optional file that receives a copy of every event
    pub file: Option<PathBuf>,
}

impl LogConfig
{
    /// Read the settings from the process environment
    ///
    /// ## Errors
    ///
    /// Returns [`LoggingError::InvalidFormat`] if `RMEM_LOG_FORMAT` is set to an
    /// unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the settings through `lookup` instead of the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup(FORMAT_VAR) {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            format,
            level: LogLevel::default(),
            directives: lookup(FILTER_VAR).filter(|value| !value.trim().is_empty()),
            file: lookup(FILE_VAR).filter(|value| !value.is_empty()).map(PathBuf::from),
        })
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError>
    {
        match &self.directives {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|_| LoggingError::InvalidLevel(directives.clone()))
            }
            None => Ok(EnvFilter::new(Level::from(self.level).to_string())),
        }
    }
}

/// Keeps the background log file writer running
///
/// Events still buffered when the guard is dropped are flushed first. Dropping
/// it early silently stops file output.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment
///
/// Reads `RUST_LOG`, `RMEM_LOG_FORMAT` and `RMEM_LOG_FILE` (see the module
/// docs). The level defaults to `info`.
///
/// ## Errors
///
/// Returns an error if:
/// - A global subscriber is already installed
/// - An environment variable holds an invalid value
/// - The log file cannot be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with_config(&LogConfig::from_env()?)
}

/// Initialize logging with an explicit level and format
///
/// `RUST_LOG` is ignored; `RMEM_LOG_FILE` is still honored.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    let config = LogConfig {
        format,
        level,
        directives: None,
        file: env::var(FILE_VAR).ok().filter(|value| !value.is_empty()).map(PathBuf::from),
    };
    init_logging_with_config(&config)
}

/// Initialize logging from resolved settings
///
/// ## Errors
///
/// See [`init_logging`].
pub fn init_logging_with_config(config: &LogConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = vec![build_layer(config.format, io::stdout, true, config.filter()?)];

    let mut file_guard = None;
    if let Some(path) = &config.file {
        let path = resolve_log_file(path)?;
        let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        fs::create_dir_all(directory)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| LoggingError::InitializationFailed(format!("{} is not a file path", path.display())))?;
        let appender = tracing_appender::rolling::never(directory, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        layers.push(build_layer(config.format, writer, false, config.filter()?));
        file_guard = Some(guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard { _file: file_guard })
}

/// Dated log file name used when `RMEM_LOG_FILE` names a directory
pub fn dated_log_file(directory: &Path) -> PathBuf
{
    let today = Local::now().format("%Y-%m-%d");
    directory.join(format!("{today}-rmem.log"))
}

fn resolve_log_file(path: &Path) -> Result<PathBuf, LoggingError>
{
    if path.is_dir() {
        return Ok(dated_log_file(path));
    }
    if path.as_os_str().is_empty() {
        return Err(LoggingError::InitializationFailed("empty log file path".to_string()));
    }
    Ok(path.to_path_buf())
}

fn build_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(ansi);

    match format {
        LogFormat::Pretty => layer.with_filter(filter).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level or filter directive
    #[error("Invalid log level: {0}. Use 'error', 'warn', 'info', 'debug', 'trace' or RUST_LOG directives")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
