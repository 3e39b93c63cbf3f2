//! Failure taxonomy types for the classification engine
//!
//! This module provides the input side (`Failure`, `WrappedFailure`) and the output side
//! (`ErrorType`, `ErrorSeverity`, `RecoveryStrategy`) of failure classification, plus
//! `ClassifiedFailure`, which bundles a failure with everything derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// The stable category a failure is classified into.
///
/// The set is closed: new kinds are added as variants, and every match over it is exhaustive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// Structural or bytecode validation failed.
    ValidationError,
    /// Existing instances could not be brought up to date after a change.
    InstanceUpdateError,
    /// A live-update/redefinition attempt failed.
    RedefinitionFailure,
    /// The operation was refused by a security check.
    SecurityError,
    /// The runtime itself is in trouble (memory or stack exhaustion).
    CriticalSystemError,
    /// A file was missing or inaccessible.
    FileSystemError,
    /// Configuration prevented the operation.
    ConfigurationError,
    /// Unrecognised failure, wrapper without a cause, or unwrap bound exceeded.
    UnknownError,
}

impl ErrorType {
    /// Returns the wire name of this error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ValidationError => "VALIDATION_ERROR",
            ErrorType::InstanceUpdateError => "INSTANCE_UPDATE_ERROR",
            ErrorType::RedefinitionFailure => "REDEFINITION_FAILURE",
            ErrorType::SecurityError => "SECURITY_ERROR",
            ErrorType::CriticalSystemError => "CRITICAL_SYSTEM_ERROR",
            ErrorType::FileSystemError => "FILE_SYSTEM_ERROR",
            ErrorType::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorType::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Returns the recovery strategy recommended for failures of this type.
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            ErrorType::ValidationError => RecoveryStrategy::RejectChange,
            ErrorType::RedefinitionFailure => RecoveryStrategy::RollbackChanges,
            ErrorType::InstanceUpdateError => RecoveryStrategy::PreserveCurrentState,
            ErrorType::CriticalSystemError => RecoveryStrategy::EmergencyShutdown,
            ErrorType::SecurityError => RecoveryStrategy::ManualIntervention,
            ErrorType::FileSystemError => RecoveryStrategy::RetryOperation,
            ErrorType::ConfigurationError => RecoveryStrategy::FallbackMode,
            ErrorType::UnknownError => RecoveryStrategy::NoAction,
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a failure is, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
    Fatal,
}

impl ErrorSeverity {
    /// Numeric level, 0 (info) through 4 (fatal).
    pub fn level(&self) -> u8 {
        match self {
            ErrorSeverity::Info => 0,
            ErrorSeverity::Warning => 1,
            ErrorSeverity::Error => 2,
            ErrorSeverity::Critical => 3,
            ErrorSeverity::Fatal => 4,
        }
    }

    /// Human-readable name.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "Informational",
            ErrorSeverity::Warning => "Warning",
            ErrorSeverity::Error => "Error",
            ErrorSeverity::Critical => "Critical",
            ErrorSeverity::Fatal => "Fatal",
        }
    }

    pub fn is_more_severe_than(&self, other: ErrorSeverity) -> bool {
        self.level() > other.level()
    }

    pub fn is_at_least_as_severe_as(&self, other: ErrorSeverity) -> bool {
        self.level() >= other.level()
    }
}

/// What a caller should do about a classified failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryStrategy {
    /// Discard the incoming change and keep running the current code.
    RejectChange,
    /// Undo the partially applied change.
    RollbackChanges,
    /// Keep existing instances as they are.
    PreserveCurrentState,
    /// Stop the process before more damage is done.
    EmergencyShutdown,
    /// Wait for an operator.
    ManualIntervention,
    /// Try the same operation again.
    RetryOperation,
    /// Continue in a degraded mode.
    FallbackMode,
    /// Nothing to do automatically.
    NoAction,
}

/// Returns false for critical system errors and for fatal severities.
pub fn is_recoverable(error_type: ErrorType, severity: ErrorSeverity) -> bool {
    error_type != ErrorType::CriticalSystemError && severity != ErrorSeverity::Fatal
}

/// Something that went wrong, as seen by the classification engine.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Failure {
    #[error("bytecode validation failed for {class_name}: {message}")]
    BytecodeValidation { class_name: String, message: String },

    #[error("instance update failed for {class_name}: {message}")]
    InstanceUpdate { class_name: String, message: String },

    #[error("redefinition of {class_name} failed: {message}")]
    Redefinition { class_name: String, message: String },

    #[error("security check failed: {message}")]
    Security { message: String },

    #[error("out of memory")]
    OutOfMemory,

    #[error("stack overflow")]
    StackOverflow,

    #[error("no such file: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("access denied: {}", .path.display())]
    AccessDenied { path: PathBuf },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// Context captured around another failure.
    #[error(transparent)]
    Snapshot(WrappedFailure),

    /// Anything the taxonomy does not recognise.
    #[error("{message}")]
    Other { message: String },
}

impl Failure {
    pub fn validation(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Failure::BytecodeValidation {
            class_name: class_name.into(),
            message: message.into(),
        }
    }

    pub fn instance_update(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Failure::InstanceUpdate {
            class_name: class_name.into(),
            message: message.into(),
        }
    }

    pub fn redefinition(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Failure::Redefinition {
            class_name: class_name.into(),
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Failure::Other {
            message: message.into(),
        }
    }

    /// Wraps this failure in a snapshot carrying `message`.
    pub fn wrap(self, message: impl Into<String>) -> Self {
        Failure::Snapshot(WrappedFailure::capture(self, message))
    }

    /// Returns true if this failure is a snapshot wrapper.
    pub fn is_snapshot(&self) -> bool {
        matches!(self, Failure::Snapshot(_))
    }
}

/// A snapshot of context around another failure.
///
/// The wrapper exclusively owns its optional original failure. Wrappers may nest,
/// and classification follows the chain up to a bounded depth.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedFailure {
    error_id: String,
    message: String,
    captured_at: DateTime<Utc>,
    debug_metadata: BTreeMap<String, String>,
    original: Option<Box<Failure>>,
}

impl WrappedFailure {
    /// Captures a snapshot around `original`.
    pub fn capture(original: Failure, message: impl Into<String>) -> Self {
        Self::build(Some(Box::new(original)), message.into())
    }

    /// Creates a snapshot whose original failure was not retained.
    pub fn without_original(message: impl Into<String>) -> Self {
        Self::build(None, message.into())
    }

    fn build(original: Option<Box<Failure>>, message: String) -> Self {
        Self {
            error_id: Uuid::new_v4().to_string(),
            message,
            captured_at: Utc::now(),
            debug_metadata: BTreeMap::new(),
            original,
        }
    }

    /// Adds a debug metadata entry to the snapshot.
    pub fn add_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.debug_metadata.insert(key.into(), value.into());
        self
    }

    pub fn error_id(&self) -> &str {
        &self.error_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn debug_metadata(&self) -> &BTreeMap<String, String> {
        &self.debug_metadata
    }

    /// The wrapped failure, if one was retained.
    pub fn original(&self) -> Option<&Failure> {
        self.original.as_deref()
    }
}

impl std::fmt::Display for WrappedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WrappedFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.original
            .as_deref()
            .map(|failure| failure as &(dyn std::error::Error + 'static))
    }
}

impl From<WrappedFailure> for Failure {
    fn from(wrapped: WrappedFailure) -> Self {
        Failure::Snapshot(wrapped)
    }
}

impl Drop for WrappedFailure {
    // Detach each layer before it drops, so freeing a chain takes constant stack.
    fn drop(&mut self) {
        let mut next = self.original.take();
        while let Some(mut failure) = next {
            next = match failure.as_mut() {
                Failure::Snapshot(inner) => inner.original.take(),
                _ => None,
            };
        }
    }
}

/// A failure together with its classification, severity and recovery advice.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedFailure {
    /// The classified category.
    pub error_type: ErrorType,
    /// The assessed severity.
    pub severity: ErrorSeverity,
    /// Suggested recovery action.
    pub recovery_strategy: RecoveryStrategy,
    /// Human-readable message taken from the failure.
    pub message: String,
    /// Additional context as key-value pairs.
    pub context: BTreeMap<String, String>,
}

impl ClassifiedFailure {
    /// Creates a classified failure; the recovery strategy follows from `error_type`.
    pub fn new(error_type: ErrorType, severity: ErrorSeverity, message: impl Into<String>) -> Self {
        Self {
            error_type,
            severity,
            recovery_strategy: error_type.recovery_strategy(),
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Adds a context key-value pair.
    pub fn add_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Returns true unless the failure is a critical system error or fatal.
    pub fn is_recoverable(&self) -> bool {
        is_recoverable(self.error_type, self.severity)
    }

    /// Returns true if the recommended strategy is to retry.
    pub fn should_retry(&self) -> bool {
        matches!(self.recovery_strategy, RecoveryStrategy::RetryOperation)
    }
}

impl std::fmt::Display for ClassifiedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_type, self.message)
    }
}
