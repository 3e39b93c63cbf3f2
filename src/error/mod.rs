//! Failure classification module
//!
//! This module maps failures onto a stable taxonomy. Every failure gets exactly one
//! `ErrorType` and one `ErrorSeverity`, and each error type carries a recommended
//! `RecoveryStrategy`.

pub mod classification;
pub mod classifier;
pub mod severity;

// Re-export main types for convenient access
pub use classification::{
    is_recoverable, ClassifiedFailure, ErrorSeverity, ErrorType, Failure, RecoveryStrategy,
    WrappedFailure,
};
pub use classifier::{
    classify, classify_failure, classify_with_defaults, DefaultErrorClassifier, ErrorClassifier,
    DEFAULT_CLASSIFIER, DEFAULT_MAX_UNWRAP_DEPTH,
};
pub use severity::{DefaultSeverityAssessor, SeverityAssessor};
