//! Failure classifier
//!
//! Maps any `Failure` to exactly one `ErrorType`. Snapshot wrappers are unwrapped with an
//! explicit loop bounded by a maximum depth, so classification always terminates and never
//! fails: anything it cannot place becomes `ErrorType::UnknownError`.

use tracing::{trace, warn};

use super::{ClassifiedFailure, ErrorType, Failure, WrappedFailure};
use super::severity::{DefaultSeverityAssessor, SeverityAssessor};

/// Default number of snapshot layers followed before giving up.
pub const DEFAULT_MAX_UNWRAP_DEPTH: usize = 32;

/// Converts a failure into a monitorable category.
pub trait ErrorClassifier {
    /// Classifies `failure`. Must be total: every input yields exactly one `ErrorType`.
    fn classify(&self, failure: &Failure) -> ErrorType;
}

/// The stateless default classifier.
///
/// Holds only its unwrap bound, so a single value can be shared by any number of threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultErrorClassifier {
    max_unwrap_depth: usize,
}

/// Process-wide classifier using `DEFAULT_MAX_UNWRAP_DEPTH`.
pub static DEFAULT_CLASSIFIER: DefaultErrorClassifier = DefaultErrorClassifier::new();

impl Default for DefaultErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultErrorClassifier {
    /// Creates a classifier with the default unwrap bound.
    pub const fn new() -> Self {
        Self::with_max_unwrap_depth(DEFAULT_MAX_UNWRAP_DEPTH)
    }

    /// Creates a classifier that follows at most `max_unwrap_depth` snapshot layers.
    pub const fn with_max_unwrap_depth(max_unwrap_depth: usize) -> Self {
        Self { max_unwrap_depth }
    }

    pub fn max_unwrap_depth(&self) -> usize {
        self.max_unwrap_depth
    }
}

impl ErrorClassifier for DefaultErrorClassifier {
    fn classify(&self, failure: &Failure) -> ErrorType {
        let error_type = match unwrap_snapshots(failure, self.max_unwrap_depth) {
            Unwrapped::Resolved(cause) => classify_cause(cause),
            Unwrapped::MissingOriginal(wrapper) => {
                trace!(
                    error_id = wrapper.error_id(),
                    "snapshot carries no original failure"
                );
                ErrorType::UnknownError
            }
            Unwrapped::DepthExceeded => {
                warn!(
                    max_unwrap_depth = self.max_unwrap_depth,
                    "failure chain exceeds unwrap depth, classifying as unknown"
                );
                ErrorType::UnknownError
            }
        };

        trace!(error_type = %error_type, "classified failure");
        error_type
    }
}

/// Classifies `failure` with the process-wide default classifier.
pub fn classify(failure: &Failure) -> ErrorType {
    DEFAULT_CLASSIFIER.classify(failure)
}

/// Classifies and assesses `failure` in one pass, using the given collaborators.
pub fn classify_failure(
    failure: &Failure,
    classifier: &impl ErrorClassifier,
    assessor: &impl SeverityAssessor,
) -> ClassifiedFailure {
    let error_type = classifier.classify(failure);
    let severity = assessor.assess(failure);
    ClassifiedFailure::new(error_type, severity, failure.to_string())
}

/// Classifies and assesses `failure` with the default classifier and assessor.
pub fn classify_with_defaults(failure: &Failure) -> ClassifiedFailure {
    classify_failure(failure, &DEFAULT_CLASSIFIER, &DefaultSeverityAssessor::new())
}

fn classify_cause(failure: &Failure) -> ErrorType {
    match failure {
        Failure::BytecodeValidation { .. } => ErrorType::ValidationError,
        Failure::InstanceUpdate { .. } => ErrorType::InstanceUpdateError,
        Failure::Redefinition { .. } => ErrorType::RedefinitionFailure,
        Failure::Security { .. } => ErrorType::SecurityError,
        Failure::OutOfMemory | Failure::StackOverflow => ErrorType::CriticalSystemError,
        Failure::FileNotFound { .. } | Failure::AccessDenied { .. } => ErrorType::FileSystemError,
        Failure::Configuration { .. } => ErrorType::ConfigurationError,
        Failure::InvalidArgument { .. }
        | Failure::InvalidState { .. }
        | Failure::Other { .. }
        // unwrap_snapshots never resolves to a wrapper
        | Failure::Snapshot(_) => ErrorType::UnknownError,
    }
}

/// Result of following a chain of snapshot wrappers.
#[derive(Debug)]
pub(crate) enum Unwrapped<'a> {
    /// The first non-wrapper failure in the chain.
    Resolved(&'a Failure),
    /// A wrapper whose original failure is absent.
    MissingOriginal(&'a WrappedFailure),
    /// More than `max_depth` wrappers were encountered.
    DepthExceeded,
}

/// Follows snapshot wrappers from `failure`, crossing at most `max_depth` of them.
pub(crate) fn unwrap_snapshots(failure: &Failure, max_depth: usize) -> Unwrapped<'_> {
    let mut current = failure;
    let mut depth = 0;

    loop {
        let Failure::Snapshot(wrapper) = current else {
            return Unwrapped::Resolved(current);
        };
        if depth >= max_depth {
            return Unwrapped::DepthExceeded;
        }
        match wrapper.original() {
            Some(original) => {
                current = original;
                depth += 1;
            }
            None => return Unwrapped::MissingOriginal(wrapper),
        }
    }
}
