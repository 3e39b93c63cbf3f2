//! Integration tests for cache outcome events and their aggregation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as Signed;
use faultlens::cache::{
    CacheEffectiveness, CacheEventError, CacheHit, CacheMiss, CacheOutcome, CacheThresholds,
    DocumentationGenerationStrategy, DocumentationRequest, MissSeverity,
};
use faultlens::error::{ErrorType, Failure};
use faultlens::metrics::{format_metrics, MetricsBuilder, MetricsCollector};

fn request() -> Arc<DocumentationRequest> {
    Arc::new(DocumentationRequest::for_method(
        "com.example.OrderService",
        "checkout",
        "user-42",
    ))
}

fn hit(request: &Arc<DocumentationRequest>, cache_age: Signed, retrieval_time: Signed) -> CacheHit {
    CacheHit::for_successful_retrieval(
        Arc::clone(request),
        "https://docs.example.com/OrderService#checkout",
        DocumentationGenerationStrategy::Cached,
        cache_age,
        retrieval_time,
        request.cache_key(),
    )
    .expect("Failed to build cache hit")
}

fn miss(request: &Arc<DocumentationRequest>, lookup_time: Signed, is_first_miss: bool) -> CacheMiss {
    CacheMiss::for_key_not_found(
        Arc::clone(request),
        request.cache_key(),
        lookup_time,
        "key not present",
        is_first_miss,
    )
    .expect("Failed to build cache miss")
}

// ============================================================================
// Effectiveness Tests
// ============================================================================

#[test]
fn test_effectiveness_examples() {
    let request = request();
    let cases = [
        (Signed::minutes(30), Signed::microseconds(500), CacheEffectiveness::Excellent),
        (Signed::minutes(30), Signed::milliseconds(5), CacheEffectiveness::Good),
        (Signed::hours(12), Signed::milliseconds(5), CacheEffectiveness::Fair),
        (Signed::days(2), Signed::milliseconds(5), CacheEffectiveness::Poor),
    ];

    for (cache_age, retrieval_time, expected) in cases {
        let event = hit(&request, cache_age, retrieval_time);
        assert_eq!(
            event.cache_effectiveness(),
            expected,
            "age={} retrieval={}",
            cache_age,
            retrieval_time
        );
    }
}

#[test]
fn test_effectiveness_edges() {
    let request = request();

    let fast_but_old = hit(&request, Signed::days(1), Signed::microseconds(1));
    assert_eq!(fast_but_old.cache_effectiveness(), CacheEffectiveness::Good);

    let almost_a_day = hit(
        &request,
        Signed::hours(23) + Signed::minutes(59),
        Signed::milliseconds(2),
    );
    assert_eq!(almost_a_day.cache_effectiveness(), CacheEffectiveness::Fair);

    let on_the_hour = hit(&request, Signed::hours(1), Signed::milliseconds(1));
    assert!(!on_the_hour.is_fresh_cache_entry());
    assert!(!on_the_hour.is_fast_retrieval());
}

#[test]
fn test_judgments_are_idempotent() {
    let event = hit(&request(), Signed::minutes(45), Signed::microseconds(900));
    let effectiveness = event.cache_effectiveness();
    let fresh = event.is_fresh_cache_entry();

    for _ in 0..100 {
        assert_eq!(event.cache_effectiveness(), effectiveness);
        assert_eq!(event.is_fresh_cache_entry(), fresh);
    }
}

// ============================================================================
// Construction Rejection Tests
// ============================================================================

#[test]
fn test_negative_durations_are_rejected() {
    let request = request();

    let negative_age = CacheHit::for_successful_retrieval(
        Arc::clone(&request),
        "url",
        DocumentationGenerationStrategy::Basic,
        Signed::milliseconds(-1),
        Signed::zero(),
        "key",
    );
    assert!(matches!(negative_age, Err(CacheEventError::NegativeCacheAge(_))));

    let negative_retrieval = CacheHit::for_successful_retrieval(
        Arc::clone(&request),
        "url",
        DocumentationGenerationStrategy::Basic,
        Signed::zero(),
        Signed::seconds(-3),
        "key",
    );
    assert!(matches!(
        negative_retrieval,
        Err(CacheEventError::NegativeRetrievalTime(_))
    ));

    let negative_lookup =
        CacheMiss::for_key_not_found(request, "key", Signed::microseconds(-5), "absent", true);
    assert!(matches!(
        negative_lookup,
        Err(CacheEventError::NegativeLookupTime(_))
    ));
}

#[test]
fn test_missing_request_is_rejected() {
    let result = CacheHit::builder()
        .cached_url("https://docs.example.com")
        .cache_key("doc:basic:deadbeef")
        .cache_age(Signed::minutes(1))
        .retrieval_time(Signed::microseconds(20))
        .build();

    assert_eq!(result, Err(CacheEventError::MissingRequest));
}

// ============================================================================
// Correlation Tests
// ============================================================================

#[test]
fn test_outcomes_correlate_to_their_request() {
    let first = request();
    let second = request();
    assert_eq!(first.cache_key(), second.cache_key());

    let outcomes: Vec<CacheOutcome> = vec![
        miss(&first, Signed::milliseconds(1), true).into(),
        hit(&second, Signed::minutes(1), Signed::microseconds(100)).into(),
    ];

    assert_eq!(outcomes[0].correlation_id(), first.request_id);
    assert_eq!(outcomes[1].correlation_id(), second.request_id);
    assert!(Arc::ptr_eq(outcomes[1].original_request(), &second));
    assert_eq!(outcomes[0].cache_key(), outcomes[1].cache_key());
}

#[test]
fn test_request_kinds_produce_distinct_keys() {
    let basic = DocumentationRequest::for_type("Foo", "u");
    let method = DocumentationRequest::for_method("Foo", "bar", "u");
    let flow = DocumentationRequest::for_contextual_flow("Foo", "checkout", "u");

    assert_ne!(basic.cache_key(), method.cache_key());
    assert_ne!(basic.cache_key(), flow.cache_key());
    assert_ne!(method.cache_key(), flow.cache_key());
    assert_eq!(basic.cache_key(), DocumentationRequest::for_type("Foo", "v").cache_key());
}

#[test]
fn test_outcome_json_carries_request() {
    let request = request();
    let outcome = CacheOutcome::from(hit(&request, Signed::minutes(2), Signed::zero()));
    let json: serde_json::Value =
        serde_json::from_str(&outcome.to_json().expect("Failed to serialize")).unwrap();

    assert_eq!(json["outcome"], "hit");
    assert_eq!(
        json["original_request"]["request_id"],
        request.request_id.to_string()
    );
    assert_eq!(json["original_strategy"], "CACHED");
}

// ============================================================================
// Miss Judgment Tests
// ============================================================================

#[test]
fn test_miss_severity() {
    let request = request();
    assert_eq!(
        miss(&request, Signed::milliseconds(1), true).miss_severity(),
        MissSeverity::Low
    );
    assert_eq!(
        miss(&request, Signed::milliseconds(50), true).miss_severity(),
        MissSeverity::Medium
    );
    assert_eq!(
        miss(&request, Signed::milliseconds(50), false).miss_severity(),
        MissSeverity::Critical
    );
    assert!(miss(&request, Signed::milliseconds(5), false).indicates_optimization_opportunity());
}

// ============================================================================
// Metrics Tests
// ============================================================================

#[test]
fn test_metrics_report() {
    let request = request();
    let mut builder = MetricsBuilder::new();

    builder.record_outcome(&miss(&request, Signed::milliseconds(3), true).into());
    builder.record_outcome(&hit(&request, Signed::minutes(5), Signed::microseconds(300)).into());
    builder.record_outcome(&hit(&request, Signed::hours(6), Signed::milliseconds(4)).into());
    builder.record_failure(&Failure::redefinition("Foo", "x").wrap("snapshot"));

    let metrics = builder.build();
    assert_eq!(metrics.total_lookups(), 3);
    assert!((metrics.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    assert_eq!(metrics.effectiveness_count(CacheEffectiveness::Excellent), 1);
    assert_eq!(metrics.effectiveness_count(CacheEffectiveness::Fair), 1);
    assert_eq!(metrics.most_common_error(), Some(ErrorType::RedefinitionFailure));
    assert_eq!(metrics.correlated_requests, 1);

    let report = format_metrics(&metrics);
    assert!(report.contains("## Cache Outcome Metrics"));
    assert!(report.contains("**LOW**: 1"));
    assert!(report.contains("REDEFINITION_FAILURE"));
}

#[test]
fn test_metrics_with_configured_thresholds() {
    let thresholds = CacheThresholds {
        fast_lookup_max: Duration::from_millis(100),
        ..CacheThresholds::default()
    };
    let mut builder =
        MetricsBuilder::with_settings(thresholds, faultlens::error::DefaultErrorClassifier::new());
    builder.record_miss(&miss(&request(), Signed::milliseconds(50), true));

    let metrics = builder.build();
    assert_eq!(metrics.miss_severity_frequency.get(&MissSeverity::Low), Some(&1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_collector_across_tasks() {
    let collector = MetricsCollector::new();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let collector = collector.clone();
            tokio::spawn(async move {
                let request = request();
                collector.record_outcome(
                    &hit(&request, Signed::minutes(1), Signed::microseconds(10)).into(),
                );
                collector.record_outcome(&miss(&request, Signed::milliseconds(1), true).into());
                collector.record_failure(&Failure::StackOverflow)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.await.expect("task panicked"),
            ErrorType::CriticalSystemError
        );
    }

    let metrics = collector.build();
    assert_eq!(metrics.total_hits, 8);
    assert_eq!(metrics.total_misses, 8);
    assert_eq!(metrics.correlated_requests, 8);
    assert_eq!(
        metrics.error_frequency.get(&ErrorType::CriticalSystemError),
        Some(&8)
    );
}
