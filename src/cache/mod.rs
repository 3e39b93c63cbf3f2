//! Documentation cache outcome events.
//!
//! A caching layer constructs a `CacheHit` or `CacheMiss` for every lookup and hands it to
//! analytics consumers as a `CacheOutcome`. Events are immutable, carry a shared reference to
//! the `DocumentationRequest` that caused the lookup, and expose pure judgments over their
//! durations.

pub mod hit;
pub mod miss;
pub mod outcome;
pub mod request;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use hit::{CacheEffectiveness, CacheHit, CacheHitBuilder};
pub use miss::{CacheMiss, MissSeverity};
pub use outcome::CacheOutcome;
pub use request::{CacheKey, DocumentationGenerationStrategy, DocumentationRequest, DocumentationType};

/// Entries younger than this are fresh.
pub const FRESH_ENTRY_MAX_AGE: Duration = Duration::from_secs(60 * 60);
/// Retrievals faster than this are fast.
pub const FAST_RETRIEVAL_MAX: Duration = Duration::from_millis(1);
/// Entries younger than this score at least fair.
pub const FAIR_ENTRY_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);
/// Miss lookups faster than this are fast.
pub const FAST_LOOKUP_MAX: Duration = Duration::from_millis(5);

/// Errors raised when a cache event is constructed from invalid input.
///
/// These indicate a bug in the caller, not an environmental failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheEventError {
    /// The event has no originating request to correlate with.
    #[error("cache event has no originating request")]
    MissingRequest,

    #[error("cache age must not be negative, got {0}")]
    NegativeCacheAge(chrono::Duration),

    #[error("retrieval time must not be negative, got {0}")]
    NegativeRetrievalTime(chrono::Duration),

    #[error("lookup time must not be negative, got {0}")]
    NegativeLookupTime(chrono::Duration),
}

/// The cut-offs used to judge cache events. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheThresholds {
    pub fresh_max_age: Duration,
    pub fast_retrieval_max: Duration,
    pub fair_max_age: Duration,
    pub fast_lookup_max: Duration,
}

impl Default for CacheThresholds {
    fn default() -> Self {
        Self {
            fresh_max_age: FRESH_ENTRY_MAX_AGE,
            fast_retrieval_max: FAST_RETRIEVAL_MAX,
            fair_max_age: FAIR_ENTRY_MAX_AGE,
            fast_lookup_max: FAST_LOOKUP_MAX,
        }
    }
}

/// Converts a signed duration, rejecting negative values.
pub(crate) fn non_negative(duration: chrono::Duration) -> Option<Duration> {
    duration.to_std().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = CacheThresholds::default();
        assert_eq!(thresholds.fresh_max_age, Duration::from_secs(3600));
        assert_eq!(thresholds.fast_retrieval_max, Duration::from_micros(1000));
        assert_eq!(thresholds.fair_max_age, Duration::from_secs(86_400));
        assert_eq!(thresholds.fast_lookup_max, Duration::from_millis(5));
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(chrono::Duration::zero()), Some(Duration::ZERO));
        assert_eq!(
            non_negative(chrono::Duration::milliseconds(7)),
            Some(Duration::from_millis(7))
        );
        assert_eq!(non_negative(chrono::Duration::milliseconds(-7)), None);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheEventError::MissingRequest.to_string(),
            "cache event has no originating request"
        );
        let err = CacheEventError::NegativeCacheAge(chrono::Duration::seconds(-2));
        assert!(err.to_string().starts_with("cache age must not be negative"));
    }
}
