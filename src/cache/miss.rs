//! Cache miss events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::request::{CacheKey, DocumentationRequest};
use super::{non_negative, CacheEventError, CacheThresholds};

/// How much a miss matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissSeverity {
    Low,
    Medium,
    Critical,
}

impl MissSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissSeverity::Low => "LOW",
            MissSeverity::Medium => "MEDIUM",
            MissSeverity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for MissSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of one failed cache lookup, correlated to its request.
/// Serialize-only, like `CacheHit`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheMiss {
    original_request: Arc<DocumentationRequest>,
    missed_cache_key: CacheKey,
    lookup_time: Duration,
    miss_reason: String,
    is_first_miss: bool,
    missed_at: DateTime<Utc>,
}

impl CacheMiss {
    /// Records a lookup that found no entry, stamping `missed_at` with the current time.
    ///
    /// # Errors
    ///
    /// Returns `CacheEventError::NegativeLookupTime` if `lookup_time` is negative.
    pub fn for_key_not_found(
        original_request: Arc<DocumentationRequest>,
        missed_cache_key: impl Into<CacheKey>,
        lookup_time: chrono::Duration,
        miss_reason: impl Into<String>,
        is_first_miss: bool,
    ) -> Result<Self, CacheEventError> {
        let Some(lookup) = non_negative(lookup_time) else {
            let err = CacheEventError::NegativeLookupTime(lookup_time);
            debug!(
                request_id = %original_request.request_id,
                error = %err,
                "rejected cache miss event"
            );
            return Err(err);
        };

        Ok(Self {
            original_request,
            missed_cache_key: missed_cache_key.into(),
            lookup_time: lookup,
            miss_reason: miss_reason.into(),
            is_first_miss,
            missed_at: Utc::now(),
        })
    }

    pub fn original_request(&self) -> &Arc<DocumentationRequest> {
        &self.original_request
    }

    pub fn correlation_id(&self) -> Uuid {
        self.original_request.request_id
    }

    pub fn missed_cache_key(&self) -> &CacheKey {
        &self.missed_cache_key
    }

    pub fn lookup_time(&self) -> Duration {
        self.lookup_time
    }

    pub fn miss_reason(&self) -> &str {
        &self.miss_reason
    }

    /// True if the key had never been looked up before.
    pub fn is_first_miss(&self) -> bool {
        self.is_first_miss
    }

    pub fn missed_at(&self) -> DateTime<Utc> {
        self.missed_at
    }

    /// A repeated miss means the entry could have been cached.
    pub fn indicates_optimization_opportunity(&self) -> bool {
        !self.is_first_miss
    }

    /// True if the lookup took less than five milliseconds.
    pub fn is_fast_lookup(&self) -> bool {
        self.is_fast_lookup_with(&CacheThresholds::default())
    }

    pub fn is_fast_lookup_with(&self, thresholds: &CacheThresholds) -> bool {
        self.lookup_time < thresholds.fast_lookup_max
    }

    pub fn miss_severity(&self) -> MissSeverity {
        self.miss_severity_with(&CacheThresholds::default())
    }

    /// First and fast is low, first or fast is medium, repeated and slow is critical.
    pub fn miss_severity_with(&self, thresholds: &CacheThresholds) -> MissSeverity {
        let fast = self.is_fast_lookup_with(thresholds);

        if self.is_first_miss && fast {
            MissSeverity::Low
        } else if self.is_first_miss || fast {
            MissSeverity::Medium
        } else {
            MissSeverity::Critical
        }
    }
}
