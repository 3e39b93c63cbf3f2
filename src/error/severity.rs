//! Severity assessment for failures.
//!
//! Uses the same bounded unwrap policy as the classifier. Wrappers that lead nowhere are
//! assessed as `ErrorSeverity::Error`, the same as any unrecognised failure.

use tracing::warn;

use super::classifier::{unwrap_snapshots, Unwrapped, DEFAULT_MAX_UNWRAP_DEPTH};
use super::{ErrorSeverity, Failure};

/// Judges how serious a failure is.
pub trait SeverityAssessor {
    /// Assesses `failure`. Must be total.
    fn assess(&self, failure: &Failure) -> ErrorSeverity;
}

/// The stateless default severity assessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultSeverityAssessor {
    max_unwrap_depth: usize,
}

impl Default for DefaultSeverityAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultSeverityAssessor {
    pub const fn new() -> Self {
        Self::with_max_unwrap_depth(DEFAULT_MAX_UNWRAP_DEPTH)
    }

    pub const fn with_max_unwrap_depth(max_unwrap_depth: usize) -> Self {
        Self { max_unwrap_depth }
    }
}

impl SeverityAssessor for DefaultSeverityAssessor {
    fn assess(&self, failure: &Failure) -> ErrorSeverity {
        match unwrap_snapshots(failure, self.max_unwrap_depth) {
            Unwrapped::Resolved(cause) => assess_cause(cause),
            Unwrapped::MissingOriginal(_) => ErrorSeverity::Error,
            Unwrapped::DepthExceeded => {
                warn!(
                    max_unwrap_depth = self.max_unwrap_depth,
                    "failure chain exceeds unwrap depth, assessing as error"
                );
                ErrorSeverity::Error
            }
        }
    }
}

fn assess_cause(failure: &Failure) -> ErrorSeverity {
    match failure {
        Failure::BytecodeValidation { .. } => ErrorSeverity::Warning,
        Failure::InstanceUpdate { .. } | Failure::Redefinition { .. } => ErrorSeverity::Error,
        Failure::Security { .. } => ErrorSeverity::Error,
        Failure::OutOfMemory | Failure::StackOverflow => ErrorSeverity::Critical,
        Failure::InvalidArgument { .. } | Failure::InvalidState { .. } => ErrorSeverity::Warning,
        Failure::FileNotFound { .. }
        | Failure::AccessDenied { .. }
        | Failure::Configuration { .. }
        | Failure::Snapshot(_)
        | Failure::Other { .. } => ErrorSeverity::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WrappedFailure;

    #[test]
    fn test_assess_direct_failures() {
        let assessor = DefaultSeverityAssessor::new();
        let cases = vec![
            (Failure::validation("Foo", "x"), ErrorSeverity::Warning),
            (Failure::instance_update("Foo", "x"), ErrorSeverity::Error),
            (Failure::redefinition("Foo", "x"), ErrorSeverity::Error),
            (
                Failure::Security {
                    message: "x".into(),
                },
                ErrorSeverity::Error,
            ),
            (Failure::OutOfMemory, ErrorSeverity::Critical),
            (Failure::StackOverflow, ErrorSeverity::Critical),
            (
                Failure::InvalidArgument {
                    message: "x".into(),
                },
                ErrorSeverity::Warning,
            ),
            (
                Failure::InvalidState {
                    message: "x".into(),
                },
                ErrorSeverity::Warning,
            ),
            (Failure::other("x"), ErrorSeverity::Error),
        ];

        for (failure, expected) in cases {
            assert_eq!(assessor.assess(&failure), expected, "{:?}", failure);
        }
    }

    #[test]
    fn test_assess_delegates_through_wrappers() {
        let assessor = DefaultSeverityAssessor::new();
        let failure = Failure::StackOverflow.wrap("inner").wrap("outer");
        assert_eq!(assessor.assess(&failure), ErrorSeverity::Critical);
    }

    #[test]
    fn test_assess_wrapper_without_original() {
        let assessor = DefaultSeverityAssessor::new();
        let failure = Failure::from(WrappedFailure::without_original("gone"));
        assert_eq!(assessor.assess(&failure), ErrorSeverity::Error);
    }

    #[test]
    fn test_assess_depth_exceeded() {
        let assessor = DefaultSeverityAssessor::with_max_unwrap_depth(1);
        let failure = Failure::validation("Foo", "x").wrap("a").wrap("b");
        assert_eq!(assessor.assess(&failure), ErrorSeverity::Error);
    }
}
