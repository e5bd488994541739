//! Error and retry-policy types for the triage domain.
//!
//! [`TriageError`] covers conditions the domain itself can detect (malformed
//! input reaching the boundary conversion). [`GatewayError`] is the shape in
//! which infrastructure failures cross the port boundary: a message plus a
//! [`RetryPolicy`] so the sweep loop can decide whether re-invoking the
//! operation is worthwhile.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that
//! participates in retry decisions must be able to produce one.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by infrastructure error types to let the sweep loop decide
/// whether to re-invoke an operation without escalating.
///
/// - `Retryable`: API timeouts, transient rate-limit responses, transport
///   failures.
/// - `NonRetryable`: authentication failures, invalid configuration, 4xx
///   responses that will not change on retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying (e.g.
    /// derived from a `Retry-After` response header).
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried; the issue is skipped for this run.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors the triage domain reports for malformed inputs.
///
/// The classifier itself is total over well-formed inputs; these errors arise
/// at the boundary where wire data is converted into domain types.
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum TriageError {
    /// A timestamp or identity field was missing or unparsable.
    ///
    /// Produced by the adapter's wire conversion, never swallowed: an issue
    /// with a malformed timeline is reported and skipped rather than
    /// misclassified.
    #[error("Invalid input in field '{field}': {message}")]
    InvalidInput {
        /// The wire field that failed validation (e.g. `"created_at"`).
        field: String,
        /// Description of what was wrong with the value.
        message: String,
    },
}

impl TriageError {
    /// Shorthand for an [`TriageError::InvalidInput`] naming `field`.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Port-boundary errors
// ---------------------------------------------------------------------------

/// An infrastructure failure surfaced through the [`crate::BoardGateway`] port.
///
/// The domain does not know about HTTP statuses or transport errors; the
/// adapter folds those into a message and a retry decision before the error
/// crosses the boundary.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GatewayError {
    message: String,
    retry: RetryPolicy,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl GatewayError {
    /// Creates a [`GatewayError`] with an explicit retry decision.
    pub fn new(message: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            message: message.into(),
            retry,
            source: None,
        }
    }

    /// Attaches the underlying infrastructure error for diagnostics.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the retry decision for this failure.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}

impl From<TriageError> for GatewayError {
    /// Malformed wire data is never retryable: the payload will not change.
    fn from(err: TriageError) -> Self {
        GatewayError::new(err.to_string(), RetryPolicy::NonRetryable)
    }
}
