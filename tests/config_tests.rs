//! Integration tests for configuration loading.
//!
//! Environment overrides are process-wide, so everything touching them lives in one test.

use std::io::Write;
use std::time::Duration;

use faultlens::config::{ConfigLoadError, TelemetryConfig};
use faultlens::error::{ErrorClassifier, ErrorType, Failure};
use faultlens::logging::LogLevel;

#[test]
fn test_file_values_and_env_overrides() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    writeln!(
        file,
        r#"
[classifier]
max_unwrap_depth = 1

[cache]
fresh_max_age_secs = 600
fast_retrieval_max_micros = 250

[logging]
level = "warn"
timestamps = false
"#
    )
    .expect("Failed to write config");

    let config = TelemetryConfig::load(file.path()).expect("Failed to load config");
    let thresholds = config.cache_thresholds();
    assert_eq!(thresholds.fresh_max_age, Duration::from_secs(600));
    assert_eq!(thresholds.fast_retrieval_max, Duration::from_micros(250));
    assert_eq!(thresholds.fair_max_age, Duration::from_secs(86_400));
    assert_eq!(thresholds.fast_lookup_max, Duration::from_millis(5));

    let logging = config.logging_config();
    assert_eq!(logging.level, LogLevel::Warn);
    assert!(!logging.with_timestamps);

    let doubly_wrapped = Failure::validation("Foo", "x").wrap("a").wrap("b");
    assert_eq!(
        config.classifier().classify(&doubly_wrapped),
        ErrorType::UnknownError
    );

    std::env::set_var("FAULTLENS__CLASSIFIER__MAX_UNWRAP_DEPTH", "8");
    let overridden = TelemetryConfig::load(file.path());
    std::env::remove_var("FAULTLENS__CLASSIFIER__MAX_UNWRAP_DEPTH");

    let overridden = overridden.expect("Failed to load config with override");
    assert_eq!(overridden.classifier.max_unwrap_depth, 8);
    assert_eq!(
        overridden.classifier().classify(&doubly_wrapped),
        ErrorType::ValidationError
    );
}

#[test]
fn test_missing_file_is_reported() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result = TelemetryConfig::load(temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigLoadError::FileNotFound(_))));
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    writeln!(file, "[cache]\nfresh_max_age_secs = \"soon\"").expect("Failed to write config");

    let result = TelemetryConfig::load(file.path());
    assert!(matches!(result, Err(ConfigLoadError::Parse(_))));
}
