//! Bounded retry with exponential backoff for GitHub API calls.
//!
//! Retries transient statuses (408, 429, 5xx) and connect/timeout transport
//! errors. `Retry-After` headers are honored when present and sane; otherwise
//! the delay doubles per attempt up to a cap.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::GithubError;

/// Retry knobs, configurable from the CLI.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles each further attempt.
    pub base_delay: Duration,
    /// Ceiling on the computed backoff.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Returns `true` for statuses worth a retry.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Parses a `Retry-After` header (seconds form).
///
/// Values of zero or over a minute are ignored: GitHub's secondary rate
/// limits stay within that range, and anything larger would stall the sweep.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs = headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()?;
    let duration = Duration::from_secs(secs);
    if duration > Duration::ZERO && duration <= Duration::from_secs(60) {
        Some(duration)
    } else {
        None
    }
}

/// Computes the delay before retry number `attempt` (1-based).
///
/// A valid `Retry-After` value wins over the exponential schedule.
pub fn retry_delay(config: &RetryConfig, attempt: u32, retry_after: Option<Duration>) -> Duration {
    if let Some(after) = retry_after {
        return after;
    }
    let exponent = attempt.saturating_sub(1).min(16);
    config
        .base_delay
        .saturating_mul(1 << exponent)
        .min(config.max_delay)
}

/// Sends a request, retrying per `config`, and returns the successful
/// response.
///
/// `build` is invoked once per attempt so the request body is rebuilt rather
/// than cloned. Non-retryable statuses surface immediately as
/// [`GithubError::Api`] with the (truncated) response body.
pub async fn send_with_retry<F>(
    operation: &'static str,
    config: &RetryConfig,
    build: F,
) -> Result<reqwest::Response, GithubError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0_u32;
    loop {
        attempt += 1;
        match build().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let retry_after = parse_retry_after(response.headers());
                if attempt < config.max_attempts.max(1) && is_retryable_status(status.as_u16()) {
                    let delay = retry_delay(config, attempt, retry_after);
                    tracing::debug!(
                        operation,
                        status = status.as_u16(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after error status"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                let body = response.text().await.unwrap_or_default();
                return Err(GithubError::Api {
                    operation,
                    status: status.as_u16(),
                    body: truncate_for_error(&body, 800),
                });
            }
            Err(error) => {
                if attempt < config.max_attempts.max(1) && is_retryable_transport_error(&error) {
                    let delay = retry_delay(config, attempt, None);
                    tracing::debug!(
                        operation,
                        error = %error,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transport error"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(GithubError::Transport { operation, source: error });
            }
        }
    }
}

fn truncate_for_error(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(max_chars).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, RETRY_AFTER};

    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(408));
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(404));
    }

    #[test]
    fn parse_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(5)));
    }

    #[test]
    fn parse_retry_after_rejects_out_of_range_values() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("0"));
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn delay_doubles_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(retry_delay(&config, 1, None), Duration::from_millis(500));
        assert_eq!(retry_delay(&config, 2, None), Duration::from_millis(1000));
        assert_eq!(retry_delay(&config, 3, None), Duration::from_millis(2000));
        assert_eq!(retry_delay(&config, 10, None), Duration::from_secs(8));
    }

    #[test]
    fn retry_after_overrides_the_schedule() {
        let config = RetryConfig::default();
        assert_eq!(
            retry_delay(&config, 1, Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let truncated = truncate_for_error(&body, 800);
        assert_eq!(truncated.chars().count(), 801);
        assert!(truncated.ends_with('…'));
    }
}
