//! Cache hit events and their derived performance judgments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::request::{CacheKey, DocumentationGenerationStrategy, DocumentationRequest};
use super::{non_negative, CacheEventError, CacheThresholds};

/// Qualitative score of a cache hit, derived from freshness and retrieval speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheEffectiveness {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CacheEffectiveness {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheEffectiveness::Excellent => "EXCELLENT",
            CacheEffectiveness::Good => "GOOD",
            CacheEffectiveness::Fair => "FAIR",
            CacheEffectiveness::Poor => "POOR",
        }
    }
}

impl std::fmt::Display for CacheEffectiveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of one successful cache lookup, correlated to its request.
///
/// Serialize-only: the factory and the builder are the only ways to create one, so `hit_at`
/// is always the moment the lookup was recorded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheHit {
    original_request: Arc<DocumentationRequest>,
    cache_key: CacheKey,
    cached_url: String,
    original_strategy: DocumentationGenerationStrategy,
    cache_age: Duration,
    retrieval_time: Duration,
    hit_at: DateTime<Utc>,
}

impl CacheHit {
    /// Records a successful retrieval, stamping `hit_at` with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if `cache_age` or `retrieval_time` is negative.
    pub fn for_successful_retrieval(
        original_request: Arc<DocumentationRequest>,
        cached_url: impl Into<String>,
        original_strategy: DocumentationGenerationStrategy,
        cache_age: chrono::Duration,
        retrieval_time: chrono::Duration,
        cache_key: impl Into<CacheKey>,
    ) -> Result<Self, CacheEventError> {
        let cache_age =
            non_negative(cache_age).ok_or(CacheEventError::NegativeCacheAge(cache_age));
        let retrieval_time =
            non_negative(retrieval_time).ok_or(CacheEventError::NegativeRetrievalTime(retrieval_time));

        let (cache_age, retrieval_time) = match (cache_age, retrieval_time) {
            (Ok(age), Ok(time)) => (age, time),
            (Err(err), _) | (_, Err(err)) => {
                debug!(
                    request_id = %original_request.request_id,
                    error = %err,
                    "rejected cache hit event"
                );
                return Err(err);
            }
        };

        Ok(Self {
            original_request,
            cache_key: cache_key.into(),
            cached_url: cached_url.into(),
            original_strategy,
            cache_age,
            retrieval_time,
            hit_at: Utc::now(),
        })
    }

    /// Starts a builder, for callers that assemble the event piecemeal.
    pub fn builder() -> CacheHitBuilder {
        CacheHitBuilder::default()
    }

    /// The request that triggered the lookup.
    pub fn original_request(&self) -> &Arc<DocumentationRequest> {
        &self.original_request
    }

    /// Identifier joining this event to its request.
    pub fn correlation_id(&self) -> Uuid {
        self.original_request.request_id
    }

    pub fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }

    pub fn cached_url(&self) -> &str {
        &self.cached_url
    }

    pub fn original_strategy(&self) -> DocumentationGenerationStrategy {
        self.original_strategy
    }

    /// Time between the entry being cached and this retrieval.
    pub fn cache_age(&self) -> Duration {
        self.cache_age
    }

    /// How long the lookup itself took.
    pub fn retrieval_time(&self) -> Duration {
        self.retrieval_time
    }

    pub fn hit_at(&self) -> DateTime<Utc> {
        self.hit_at
    }

    /// True if the entry is younger than one hour.
    pub fn is_fresh_cache_entry(&self) -> bool {
        self.is_fresh_cache_entry_with(&CacheThresholds::default())
    }

    /// True if the lookup took less than one millisecond.
    pub fn is_fast_retrieval(&self) -> bool {
        self.is_fast_retrieval_with(&CacheThresholds::default())
    }

    /// Scores this hit against the default thresholds.
    pub fn cache_effectiveness(&self) -> CacheEffectiveness {
        self.cache_effectiveness_with(&CacheThresholds::default())
    }

    pub fn is_fresh_cache_entry_with(&self, thresholds: &CacheThresholds) -> bool {
        self.cache_age < thresholds.fresh_max_age
    }

    pub fn is_fast_retrieval_with(&self, thresholds: &CacheThresholds) -> bool {
        self.retrieval_time < thresholds.fast_retrieval_max
    }

    /// Scores this hit. The rules are a strict priority chain: fast and fresh is excellent,
    /// fast or fresh is good, younger than the fair age is fair, anything else is poor.
    pub fn cache_effectiveness_with(&self, thresholds: &CacheThresholds) -> CacheEffectiveness {
        let fast = self.is_fast_retrieval_with(thresholds);
        let fresh = self.is_fresh_cache_entry_with(thresholds);

        if fast && fresh {
            CacheEffectiveness::Excellent
        } else if fast || fresh {
            CacheEffectiveness::Good
        } else if self.cache_age < thresholds.fair_max_age {
            CacheEffectiveness::Fair
        } else {
            CacheEffectiveness::Poor
        }
    }
}

/// Builder for `CacheHit`.
///
/// The request is mandatory; `build` rejects a builder without one. When no cache key is
/// given, the request's derived key is used.
#[derive(Debug)]
pub struct CacheHitBuilder {
    original_request: Option<Arc<DocumentationRequest>>,
    cached_url: String,
    original_strategy: DocumentationGenerationStrategy,
    cache_age: chrono::Duration,
    retrieval_time: chrono::Duration,
    cache_key: Option<CacheKey>,
}

impl Default for CacheHitBuilder {
    fn default() -> Self {
        Self {
            original_request: None,
            cached_url: String::new(),
            original_strategy: DocumentationGenerationStrategy::default(),
            cache_age: chrono::Duration::zero(),
            retrieval_time: chrono::Duration::zero(),
            cache_key: None,
        }
    }
}

impl CacheHitBuilder {
    pub fn original_request(mut self, request: Arc<DocumentationRequest>) -> Self {
        self.original_request = Some(request);
        self
    }

    pub fn cached_url(mut self, url: impl Into<String>) -> Self {
        self.cached_url = url.into();
        self
    }

    pub fn original_strategy(mut self, strategy: DocumentationGenerationStrategy) -> Self {
        self.original_strategy = strategy;
        self
    }

    pub fn cache_age(mut self, age: chrono::Duration) -> Self {
        self.cache_age = age;
        self
    }

    pub fn retrieval_time(mut self, time: chrono::Duration) -> Self {
        self.retrieval_time = time;
        self
    }

    pub fn cache_key(mut self, key: impl Into<CacheKey>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Builds the event.
    ///
    /// # Errors
    ///
    /// Returns `CacheEventError::MissingRequest` without a request, and the negative-duration
    /// errors of `CacheHit::for_successful_retrieval`.
    pub fn build(self) -> Result<CacheHit, CacheEventError> {
        let request = self.original_request.ok_or_else(|| {
            debug!("rejected cache hit event without an originating request");
            CacheEventError::MissingRequest
        })?;
        let cache_key = self.cache_key.unwrap_or_else(|| request.cache_key());

        CacheHit::for_successful_retrieval(
            request,
            self.cached_url,
            self.original_strategy,
            self.cache_age,
            self.retrieval_time,
            cache_key,
        )
    }
}
