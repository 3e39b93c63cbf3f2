//! Outcome metrics collection.
//!
//! This module aggregates cache outcome events and failure classifications into
//! summary statistics for monitoring dashboards and reports.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

use crate::cache::{CacheEffectiveness, CacheHit, CacheMiss, CacheOutcome, CacheThresholds, MissSeverity};
use crate::error::{DefaultErrorClassifier, ErrorClassifier, ErrorType, Failure};

/// Aggregated metrics across recorded outcomes and failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeMetrics {
    /// Successful lookups
    pub total_hits: u32,
    /// Failed lookups
    pub total_misses: u32,
    /// Hits per effectiveness category
    pub effectiveness_frequency: HashMap<CacheEffectiveness, u32>,
    /// Misses per severity
    pub miss_severity_frequency: HashMap<MissSeverity, u32>,
    /// Repeated misses for keys that had been looked up before
    pub optimization_opportunities: u32,
    /// Classified failures per error type
    pub error_frequency: HashMap<ErrorType, u32>,
    /// Hit retrieval times
    pub retrieval_time: DurationStats,
    /// Miss lookup times
    pub lookup_time: DurationStats,
    /// Number of distinct requests the outcomes correlate to
    pub correlated_requests: u32,
}

impl OutcomeMetrics {
    /// Total lookups, hits and misses together.
    pub fn total_lookups(&self) -> u32 {
        self.total_hits + self.total_misses
    }

    /// Fraction of lookups that hit.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_lookups();
        if total == 0 {
            return 0.0;
        }
        self.total_hits as f64 / total as f64
    }

    /// Get the most common error type.
    pub fn most_common_error(&self) -> Option<ErrorType> {
        self.error_frequency
            .iter()
            .max_by_key(|(_, count)| *count)
            .map(|(error_type, _)| *error_type)
    }

    /// Number of hits in the given effectiveness category.
    pub fn effectiveness_count(&self, effectiveness: CacheEffectiveness) -> u32 {
        self.effectiveness_frequency
            .get(&effectiveness)
            .copied()
            .unwrap_or(0)
    }

    /// Render as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Duration statistics for a stream of samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationStats {
    /// Number of samples
    pub count: u32,
    /// Mean duration
    pub mean: Duration,
    /// Minimum duration
    pub min: Duration,
    /// Maximum duration
    pub max: Duration,
    /// Sum of all durations (for calculating mean)
    pub total: Duration,
}

impl DurationStats {
    /// Add a new duration sample.
    pub fn add_sample(&mut self, duration: Duration) {
        self.count += 1;
        self.total += duration;
        self.mean = self.total / self.count;

        if self.count == 1 {
            self.min = duration;
            self.max = duration;
        } else {
            self.min = self.min.min(duration);
            self.max = self.max.max(duration);
        }
    }
}

/// Accumulates outcomes and failures for a reporting window.
#[derive(Debug, Clone)]
pub struct MetricsBuilder {
    thresholds: CacheThresholds,
    classifier: DefaultErrorClassifier,
    metrics: OutcomeMetrics,
    requests: HashSet<Uuid>,
}

impl MetricsBuilder {
    /// Create a new metrics builder using the default thresholds and classifier.
    pub fn new() -> Self {
        Self::with_settings(CacheThresholds::default(), DefaultErrorClassifier::new())
    }

    /// Create a builder that judges events and classifies failures with the given settings.
    pub fn with_settings(thresholds: CacheThresholds, classifier: DefaultErrorClassifier) -> Self {
        Self {
            thresholds,
            classifier,
            metrics: OutcomeMetrics::default(),
            requests: HashSet::new(),
        }
    }

    /// Record a cache hit.
    pub fn record_hit(&mut self, hit: &CacheHit) {
        self.metrics.total_hits += 1;
        *self
            .metrics
            .effectiveness_frequency
            .entry(hit.cache_effectiveness_with(&self.thresholds))
            .or_insert(0) += 1;
        self.metrics.retrieval_time.add_sample(hit.retrieval_time());
        self.track_request(hit.correlation_id());
    }

    /// Record a cache miss.
    pub fn record_miss(&mut self, miss: &CacheMiss) {
        self.metrics.total_misses += 1;
        *self
            .metrics
            .miss_severity_frequency
            .entry(miss.miss_severity_with(&self.thresholds))
            .or_insert(0) += 1;
        if miss.indicates_optimization_opportunity() {
            self.metrics.optimization_opportunities += 1;
        }
        self.metrics.lookup_time.add_sample(miss.lookup_time());
        self.track_request(miss.correlation_id());
    }

    /// Record either kind of outcome.
    pub fn record_outcome(&mut self, outcome: &CacheOutcome) {
        match outcome {
            CacheOutcome::Hit(hit) => self.record_hit(hit),
            CacheOutcome::Miss(miss) => self.record_miss(miss),
        }
    }

    /// Classify a failure and record its type.
    pub fn record_failure(&mut self, failure: &Failure) -> ErrorType {
        let error_type = self.classifier.classify(failure);
        self.record_error_type(error_type);
        error_type
    }

    /// Record an already classified error type.
    pub fn record_error_type(&mut self, error_type: ErrorType) {
        *self.metrics.error_frequency.entry(error_type).or_insert(0) += 1;
    }

    fn track_request(&mut self, request_id: Uuid) {
        if self.requests.insert(request_id) {
            self.metrics.correlated_requests += 1;
        }
    }

    /// Current metrics without consuming the builder.
    pub fn snapshot(&self) -> OutcomeMetrics {
        self.metrics.clone()
    }

    /// Build the final aggregated metrics.
    pub fn build(self) -> OutcomeMetrics {
        self.metrics
    }
}

impl Default for MetricsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe metrics collector for concurrent producers.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    inner: Arc<RwLock<MetricsBuilder>>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::from_builder(MetricsBuilder::new())
    }

    /// Wrap an existing builder.
    pub fn from_builder(builder: MetricsBuilder) -> Self {
        Self {
            inner: Arc::new(RwLock::new(builder)),
        }
    }

    /// Record a cache hit (thread-safe).
    pub fn record_hit(&self, hit: &CacheHit) {
        if let Ok(mut builder) = self.inner.write() {
            builder.record_hit(hit);
        }
    }

    /// Record a cache miss (thread-safe).
    pub fn record_miss(&self, miss: &CacheMiss) {
        if let Ok(mut builder) = self.inner.write() {
            builder.record_miss(miss);
        }
    }

    /// Record an outcome (thread-safe).
    pub fn record_outcome(&self, outcome: &CacheOutcome) {
        if let Ok(mut builder) = self.inner.write() {
            builder.record_outcome(outcome);
        }
    }

    /// Classify and record a failure (thread-safe).
    ///
    /// Classification happens even if the lock is poisoned; only the recording is skipped.
    pub fn record_failure(&self, failure: &Failure) -> ErrorType {
        match self.inner.write() {
            Ok(mut builder) => builder.record_failure(failure),
            Err(poisoned) => poisoned.get_ref().classifier.classify(failure),
        }
    }

    /// Record an error type (thread-safe).
    pub fn record_error_type(&self, error_type: ErrorType) {
        if let Ok(mut builder) = self.inner.write() {
            builder.record_error_type(error_type);
        }
    }

    /// Build the current metrics.
    pub fn build(&self) -> OutcomeMetrics {
        if let Ok(builder) = self.inner.read() {
            builder.snapshot()
        } else {
            OutcomeMetrics::default()
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{:.3}ms", duration.as_secs_f64() * 1000.0)
}

/// Format metrics for display.
pub fn format_metrics(metrics: &OutcomeMetrics) -> String {
    let mut output = String::from("## Cache Outcome Metrics\n\n");

    // Summary statistics
    output.push_str("### Summary\n");
    output.push_str(&format!(
        "- **Total Lookups**: {} ({} hits, {} misses)\n",
        metrics.total_lookups(),
        metrics.total_hits,
        metrics.total_misses
    ));
    output.push_str(&format!(
        "- **Hit Rate**: {:.1}%\n",
        metrics.hit_rate() * 100.0
    ));
    output.push_str(&format!(
        "- **Correlated Requests**: {}\n",
        metrics.correlated_requests
    ));
    output.push_str(&format!(
        "- **Optimization Opportunities**: {}\n",
        metrics.optimization_opportunities
    ));

    if metrics.retrieval_time.count > 0 {
        output.push_str(&format!(
            "- **Retrieval Time**: mean={}, min={}, max={}\n",
            format_duration(metrics.retrieval_time.mean),
            format_duration(metrics.retrieval_time.min),
            format_duration(metrics.retrieval_time.max)
        ));
    }
    if metrics.lookup_time.count > 0 {
        output.push_str(&format!(
            "- **Miss Lookup Time**: mean={}, min={}, max={}\n",
            format_duration(metrics.lookup_time.mean),
            format_duration(metrics.lookup_time.min),
            format_duration(metrics.lookup_time.max)
        ));
    }

    if !metrics.effectiveness_frequency.is_empty() {
        output.push_str("\n### Cache Effectiveness\n");
        let mut levels: Vec<_> = metrics.effectiveness_frequency.iter().collect();
        levels.sort_by_key(|(level, _)| **level);
        for (level, count) in levels {
            output.push_str(&format!("- **{}**: {}\n", level, count));
        }
    }

    if !metrics.miss_severity_frequency.is_empty() {
        output.push_str("\n### Miss Severity\n");
        let mut severities: Vec<_> = metrics.miss_severity_frequency.iter().collect();
        severities.sort_by_key(|(severity, _)| **severity);
        for (severity, count) in severities {
            output.push_str(&format!("- **{}**: {}\n", severity, count));
        }
    }

    // Error frequencies
    if !metrics.error_frequency.is_empty() {
        output.push_str("\n### Error Frequencies\n");
        let mut errors: Vec<_> = metrics.error_frequency.iter().collect();
        errors.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        for (error_type, count) in errors {
            output.push_str(&format!(
                "- **{}**: {} occurrences\n",
                error_type.as_str(),
                count
            ));
        }
    }

    output
}
