//! Telemetry configuration.
//!
//! Settings are loaded from a TOML file with environment variable overrides. Every key is
//! optional; missing keys fall back to the built-in defaults.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::cache::{
    CacheThresholds, FAIR_ENTRY_MAX_AGE, FAST_LOOKUP_MAX, FAST_RETRIEVAL_MAX, FRESH_ENTRY_MAX_AGE,
};
use crate::error::{DefaultErrorClassifier, DefaultSeverityAssessor, DEFAULT_MAX_UNWRAP_DEPTH};
use crate::logging::{LogLevel, LoggingConfig};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "FAULTLENS";

/// Errors that can occur when loading telemetry configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),
}

/// Classifier settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    /// How many snapshot layers to follow before giving up
    #[serde(default = "default_max_unwrap_depth")]
    pub max_unwrap_depth: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            max_unwrap_depth: DEFAULT_MAX_UNWRAP_DEPTH,
        }
    }
}

fn default_max_unwrap_depth() -> usize {
    DEFAULT_MAX_UNWRAP_DEPTH
}

/// Cache judgment thresholds, in whole units.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Entries younger than this many seconds are fresh
    #[serde(default = "default_fresh_max_age_secs")]
    pub fresh_max_age_secs: u64,
    /// Retrievals faster than this many microseconds are fast
    #[serde(default = "default_fast_retrieval_max_micros")]
    pub fast_retrieval_max_micros: u64,
    /// Entries younger than this many seconds are at least fair
    #[serde(default = "default_fair_max_age_secs")]
    pub fair_max_age_secs: u64,
    /// Miss lookups faster than this many milliseconds are fast
    #[serde(default = "default_fast_lookup_max_millis")]
    pub fast_lookup_max_millis: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            fresh_max_age_secs: default_fresh_max_age_secs(),
            fast_retrieval_max_micros: default_fast_retrieval_max_micros(),
            fair_max_age_secs: default_fair_max_age_secs(),
            fast_lookup_max_millis: default_fast_lookup_max_millis(),
        }
    }
}

fn default_fresh_max_age_secs() -> u64 {
    FRESH_ENTRY_MAX_AGE.as_secs()
}

fn default_fast_retrieval_max_micros() -> u64 {
    FAST_RETRIEVAL_MAX.as_micros() as u64
}

fn default_fair_max_age_secs() -> u64 {
    FAIR_ENTRY_MAX_AGE.as_secs()
}

fn default_fast_lookup_max_millis() -> u64 {
    FAST_LOOKUP_MAX.as_millis() as u64
}

impl CacheSettings {
    /// Convert to the thresholds used by cache events.
    pub fn thresholds(&self) -> CacheThresholds {
        CacheThresholds {
            fresh_max_age: Duration::from_secs(self.fresh_max_age_secs),
            fast_retrieval_max: Duration::from_micros(self.fast_retrieval_max_micros),
            fair_max_age: Duration::from_secs(self.fair_max_age_secs),
            fast_lookup_max: Duration::from_millis(self.fast_lookup_max_millis),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl TelemetryConfig {
    /// Load telemetry configuration from a file path.
    ///
    /// Environment variables override file values using the format
    /// `FAULTLENS__<SECTION>__<KEY>` (e.g. `FAULTLENS__CLASSIFIER__MAX_UNWRAP_DEPTH=8`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be parsed, or the path is not
    /// valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use faultlens::config::TelemetryConfig;
    ///
    /// let config = TelemetryConfig::load("faultlens.toml")?;
    /// # Ok::<(), faultlens::config::ConfigLoadError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigLoadError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::with_name(path_str))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Classifier honouring the configured unwrap depth.
    pub fn classifier(&self) -> DefaultErrorClassifier {
        DefaultErrorClassifier::with_max_unwrap_depth(self.classifier.max_unwrap_depth)
    }

    /// Severity assessor honouring the configured unwrap depth.
    pub fn severity_assessor(&self) -> DefaultSeverityAssessor {
        DefaultSeverityAssessor::with_max_unwrap_depth(self.classifier.max_unwrap_depth)
    }

    pub fn cache_thresholds(&self) -> CacheThresholds {
        self.cache.thresholds()
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::new()
            .with_level(self.logging.level)
            .with_timestamps(self.logging.timestamps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_builtin_constants() {
        let config = TelemetryConfig::default();
        assert_eq!(config.classifier().max_unwrap_depth(), DEFAULT_MAX_UNWRAP_DEPTH);
        assert_eq!(config.cache_thresholds(), CacheThresholds::default());
        assert!(config.logging.timestamps);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        writeln!(
            file,
            "[classifier]\nmax_unwrap_depth = 4\n\n[cache]\nfast_lookup_max_millis = 20\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = TelemetryConfig::load(file.path()).expect("Failed to load config");
        assert_eq!(config.classifier.max_unwrap_depth, 4);
        assert_eq!(config.cache.fast_lookup_max_millis, 20);
        assert_eq!(config.cache.fresh_max_age_secs, 3600);
        assert!(matches!(config.logging.level, LogLevel::Debug));
    }

    #[test]
    fn test_load_missing_file() {
        let result = TelemetryConfig::load("/nonexistent/faultlens.toml");
        assert!(matches!(result, Err(ConfigLoadError::FileNotFound(_))));
    }
}
