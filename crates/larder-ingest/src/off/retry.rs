// Retry policy for search requests

use reqwest::header::HeaderValue;
use reqwest::StatusCode;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Upper bound for any single wait, including server-supplied Retry-After.
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(120);

/// Statuses worth another try: rate limiting and gateway/server hiccups.
pub const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts in total, the first one included
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_max: DEFAULT_BACKOFF_MAX,
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_base: Duration::ZERO,
            backoff_max: Duration::ZERO,
        }
    }

    pub fn is_retryable_status(status: StatusCode) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Whether a Retry-After header on this status should be obeyed
    pub fn honors_retry_after(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
    }

    /// Wait before retry number `retry` (1 is the wait before the second
    /// attempt): `base * 2^(retry - 1)`, capped at `backoff_max`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }

    /// Server hint wins over the computed backoff; both are capped.
    pub fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint.min(self.backoff_max),
            None => self.backoff(retry),
        }
    }
}

/// Parse a `Retry-After` value given in seconds. HTTP-date values are
/// ignored and fall back to the computed backoff.
pub fn parse_retry_after(value: &HeaderValue) -> Option<Duration> {
    value
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(8), Duration::from_secs(120));
        assert_eq!(policy.backoff(40), Duration::from_secs(120));
    }

    #[test]
    fn test_retry_after_overrides_and_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1, Some(Duration::from_secs(7))), Duration::from_secs(7));
        assert_eq!(policy.delay_for(1, Some(Duration::from_secs(3600))), Duration::from_secs(120));
        assert_eq!(policy.delay_for(3, None), Duration::from_secs(4));
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [429, 500, 502, 503, 504] {
            assert!(RetryPolicy::is_retryable_status(StatusCode::from_u16(code).unwrap()));
        }
        for code in [400, 401, 403, 404, 501] {
            assert!(!RetryPolicy::is_retryable_status(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(
            parse_retry_after(&HeaderValue::from_static(" 12 ")),
            Some(Duration::from_secs(12))
        );
        assert_eq!(
            parse_retry_after(&HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT")),
            None
        );
    }
}
