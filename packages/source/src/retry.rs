//! HTTP retry helpers for transient errors.
//!
//! Year files are fetched through [`send_text`] rather than calling
//! `reqwest::RequestBuilder::send()` directly, so timeouts, connection
//! resets, HTTP 429, and server errors are retried with exponential
//! backoff. Any other non-success status fails immediately.
//!
//! ```ignore
//! let csv = retry::send_text(&RetryPolicy::default(), || client.get(&url)).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// How many times and how patiently to retry a request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three retries at 1s, 2s, 4s.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor)
    }
}

/// Sends an HTTP request and returns the response body as a `String`.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status code, or the body cannot be read.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(policy: &RetryPolicy, build_request: F) -> Result<String, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(policy, &build_request).await?;
    let url = response.url().to_string();
    let text = response.text().await?;
    log::debug!("Downloaded {} bytes from {url}", text.len());
    Ok(text)
}

#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    policy: &RetryPolicy,
    build_request: &F,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = policy.backoff(attempt);
            log::warn!("  retry {attempt}/{} in {delay:?}...", policy.max_retries);
            tokio::time::sleep(delay).await;
        }
        let can_retry = attempt < policy.max_retries;
        attempt += 1;

        let response = match build_request().send().await {
            Ok(response) => response,
            Err(e) if is_transient(&e) && can_retry => {
                log::warn!("  transient error: {e}");
                continue;
            }
            Err(e) => return Err(SourceError::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retryable =
            status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
        if retryable && can_retry {
            log::warn!("  HTTP {status} from {}", response.url());
            continue;
        }

        return Err(SourceError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        });
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
    }

    #[test]
    fn backoff_saturates() {
        let policy = RetryPolicy {
            max_retries: u32::MAX,
            base_delay: Duration::from_secs(u64::MAX / 2),
        };
        assert_eq!(policy.backoff(100), Duration::MAX);
    }

    #[test]
    fn none_policy_has_no_retries() {
        assert_eq!(RetryPolicy::none().max_retries, 0);
        assert_eq!(RetryPolicy::none().backoff(1), Duration::ZERO);
    }
}
