//! The sum of hit and miss events, as handed to analytics consumers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::hit::CacheHit;
use super::miss::CacheMiss;
use super::request::{CacheKey, DocumentationRequest};

/// One cache lookup outcome.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CacheOutcome {
    Hit(CacheHit),
    Miss(CacheMiss),
}

impl CacheOutcome {
    /// The request that triggered the lookup. Consumers join on this, not on the cache key.
    pub fn original_request(&self) -> &Arc<DocumentationRequest> {
        match self {
            CacheOutcome::Hit(hit) => hit.original_request(),
            CacheOutcome::Miss(miss) => miss.original_request(),
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.original_request().request_id
    }

    pub fn cache_key(&self) -> &CacheKey {
        match self {
            CacheOutcome::Hit(hit) => hit.cache_key(),
            CacheOutcome::Miss(miss) => miss.missed_cache_key(),
        }
    }

    /// When the outcome was recorded.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CacheOutcome::Hit(hit) => hit.hit_at(),
            CacheOutcome::Miss(miss) => miss.missed_at(),
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::Hit(_))
    }

    /// Serializes the outcome for publication.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<CacheHit> for CacheOutcome {
    fn from(hit: CacheHit) -> Self {
        CacheOutcome::Hit(hit)
    }
}

impl From<CacheMiss> for CacheOutcome {
    fn from(miss: CacheMiss) -> Self {
        CacheOutcome::Miss(miss)
    }
}
