//! GitHub adapter error type and its retry mapping.

use thiserror::Error;
use triage::{GatewayError, RetryPolicy, TriageError};

use crate::retry::is_retryable_status;

/// Failures the GitHub adapter can encounter.
///
/// Every variant knows whether it is worth retrying; the mapping into the
/// domain's [`RetryPolicy`] happens in [`GithubError::retry_policy`], and the
/// conversion into [`GatewayError`] carries it across the port boundary.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The API answered with a non-success status after retries were
    /// exhausted (or the status was not worth retrying).
    #[error("github api {operation} failed with status {status}: {body}")]
    Api {
        /// Human-readable name of the API operation.
        operation: &'static str,
        /// The HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("github api {operation} transport failure")]
    Transport {
        /// Human-readable name of the API operation.
        operation: &'static str,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered 2xx but the body did not have the expected shape.
    #[error("unexpected payload from {operation}: {message}")]
    Payload {
        /// Human-readable name of the API operation.
        operation: &'static str,
        /// What was wrong with the body.
        message: String,
    },

    /// A payload field failed domain validation (bad timestamp, empty login).
    #[error(transparent)]
    Invalid(#[from] TriageError),

    /// The client could not be constructed (unusable token, bad base URL).
    #[error("github client configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl GithubError {
    /// Returns the retry decision for this failure.
    ///
    /// Transport failures and transient statuses are retryable; everything
    /// else will not improve on a second attempt.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            GithubError::Api { status, .. } if is_retryable_status(*status) => {
                RetryPolicy::Retryable { after: None }
            }
            GithubError::Transport { .. } => RetryPolicy::Retryable { after: None },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

impl From<GithubError> for GatewayError {
    fn from(err: GithubError) -> Self {
        let retry = err.retry_policy();
        GatewayError::new(err.to_string(), retry).with_source(err)
    }
}
