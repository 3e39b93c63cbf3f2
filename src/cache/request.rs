//! Documentation requests and the cache keys derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// The kind of documentation being asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentationType {
    /// Documentation for a whole type.
    Basic,
    /// Documentation for a single method.
    Method,
    /// Documentation for a type within a runtime flow.
    Contextual,
}

impl DocumentationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentationType::Basic => "basic",
            DocumentationType::Method => "method",
            DocumentationType::Contextual => "contextual",
        }
    }
}

/// Which generation strategy produced a documentation URL.
///
/// Owned by the generation subsystem; cache events carry it through unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentationGenerationStrategy {
    #[default]
    Basic,
    Contextual,
    Cached,
    FlowSpecific,
}

/// A lookup key for the documentation cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// The original ask for a documentation URL. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationRequest {
    /// Unique identifier, used to correlate response events.
    pub request_id: Uuid,
    /// Fully qualified name of the type documentation was requested for.
    pub requesting_type: String,
    /// Method name, for method-level requests.
    pub method_name: Option<String>,
    /// What kind of documentation was requested.
    pub documentation_type: DocumentationType,
    /// Name of the runtime flow, for contextual requests.
    pub flow_context: Option<String>,
    /// Who asked.
    pub requesting_user_id: String,
    /// When the request was made.
    pub requested_at: DateTime<Utc>,
}

impl DocumentationRequest {
    /// Requests documentation for a whole type.
    pub fn for_type(requesting_type: impl Into<String>, requesting_user_id: impl Into<String>) -> Self {
        Self::new(
            requesting_type.into(),
            None,
            DocumentationType::Basic,
            None,
            requesting_user_id.into(),
        )
    }

    /// Requests documentation for a single method of a type.
    pub fn for_method(
        requesting_type: impl Into<String>,
        method_name: impl Into<String>,
        requesting_user_id: impl Into<String>,
    ) -> Self {
        Self::new(
            requesting_type.into(),
            Some(method_name.into()),
            DocumentationType::Method,
            None,
            requesting_user_id.into(),
        )
    }

    /// Requests documentation for a type as it participates in a runtime flow.
    pub fn for_contextual_flow(
        requesting_type: impl Into<String>,
        flow_name: impl Into<String>,
        requesting_user_id: impl Into<String>,
    ) -> Self {
        Self::new(
            requesting_type.into(),
            None,
            DocumentationType::Contextual,
            Some(flow_name.into()),
            requesting_user_id.into(),
        )
    }

    fn new(
        requesting_type: String,
        method_name: Option<String>,
        documentation_type: DocumentationType,
        flow_context: Option<String>,
        requesting_user_id: String,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            requesting_type,
            method_name,
            documentation_type,
            flow_context,
            requesting_user_id,
            requested_at: Utc::now(),
        }
    }

    /// Overrides the logical request timestamp.
    pub fn with_requested_at(mut self, requested_at: DateTime<Utc>) -> Self {
        self.requested_at = requested_at;
        self
    }

    /// Short human-readable subject, e.g. `Foo.bar` or `Foo@checkout`.
    pub fn subject(&self) -> String {
        let mut subject = self.requesting_type.clone();
        if let Some(method) = &self.method_name {
            subject.push('.');
            subject.push_str(method);
        }
        if let Some(flow) = &self.flow_context {
            subject.push('@');
            subject.push_str(flow);
        }
        subject
    }

    /// Derives the cache key for this request.
    ///
    /// Depends only on what is documented, never on who asked or the request id, so distinct
    /// requests for the same subject share a key.
    pub fn cache_key(&self) -> CacheKey {
        let mut hasher = Sha256::new();
        hasher.update(self.documentation_type.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.subject().as_bytes());
        let digest = hex::encode(hasher.finalize());

        CacheKey(format!(
            "doc:{}:{}",
            self.documentation_type.as_str(),
            &digest[..16]
        ))
    }
}
