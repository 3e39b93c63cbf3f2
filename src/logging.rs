//! Structured logging setup.
//!
//! The library itself only emits `tracing` events. Applications embedding it can call
//! [`init_logging`] once to install a stderr subscriber that:
//! - Honours `RUST_LOG` when set, and the configured level otherwise
//! - Optionally includes timestamps, targets, thread ids and source locations

use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - includes every classification
    Trace,
    /// Debug level - includes rejected cache events
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warning level - unwrap bound violations
    Warn,
    /// Error level
    Error,
    /// Disable logging entirely
    Off,
}

impl LogLevel {
    /// Filter directive for this level.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber was already set.
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub with_timestamps: bool,
    /// Whether to include the target (module path)
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_file: bool,
    pub with_line_number: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_timestamps: true,
            with_target: true,
            with_thread_ids: false,
            with_file: false,
            with_line_number: false,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.with_timestamps = enabled;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// Include file and line of each event.
    pub fn with_source_location(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self.with_line_number = enabled;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.level.as_directive())
        }
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr.
///
/// # Errors
///
/// Returns `LoggingError::Install` if a global subscriber is already set.
///
/// # Examples
///
/// ```no_run
/// use faultlens::logging::{init_logging, LogLevel, LoggingConfig};
///
/// init_logging(LoggingConfig::new().with_level(LogLevel::Debug))?;
/// # Ok::<(), faultlens::logging::LoggingError>(())
/// ```
pub fn init_logging(config: LoggingConfig) -> Result<(), LoggingError> {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids)
        .with_file(config.with_file)
        .with_line_number(config.with_line_number);

    let installed = if config.with_timestamps {
        subscriber.try_init()
    } else {
        subscriber.without_time().try_init()
    };

    installed.map_err(|err| LoggingError::Install(err.to_string()))
}

/// Install the global subscriber with the default configuration.
pub fn init_default_logging() -> Result<(), LoggingError> {
    init_logging(LoggingConfig::default())
}
