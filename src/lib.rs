//! Faultlens - failure classification and documentation cache telemetry
//!
//! This library provides:
//! - [`error`]: a total mapping from runtime failures to error categories, severities
//!   and recovery strategies, unwrapping captured error snapshots along the way
//! - [`cache`]: immutable cache hit and miss events correlated to the request that caused them
//! - [`metrics`]: aggregation of outcomes and classified failures for reporting
//! - [`config`] and [`logging`]: file and environment configuration plus `tracing` setup

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use cache::{CacheEffectiveness, CacheHit, CacheMiss, CacheOutcome, DocumentationRequest};
pub use error::{classify, ErrorClassifier, ErrorType, Failure, DEFAULT_CLASSIFIER};
