use std::time::Duration;

use crate::config::RetryConfig;

/// Classification of a transient failure, used to decide whether a retry
/// spec applies (spec §7, §9 "single reusable backoff specification" used
/// by both fetcher and extractor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Dns,
    Refused,
    Status4xx,
    Status429,
    Status5xx,
    Ssl,
    Other,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureKind::Status4xx | FailureKind::Ssl)
    }
}

/// Backoff duration for the given attempt (0-indexed), capped at `cap_ms`.
pub fn backoff_duration(retry: &RetryConfig, attempt: u32) -> Duration {
    let exp = retry.base_ms.saturating_mul(1u64 << attempt.min(16));
    Duration::from_millis(exp.min(retry.cap_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        let retry = RetryConfig { base_ms: 500, cap_ms: 4_000, max_attempts: 5 };
        assert_eq!(backoff_duration(&retry, 0), Duration::from_millis(500));
        assert_eq!(backoff_duration(&retry, 1), Duration::from_millis(1_000));
        assert_eq!(backoff_duration(&retry, 2), Duration::from_millis(2_000));
        assert_eq!(backoff_duration(&retry, 3), Duration::from_millis(4_000));
        assert_eq!(backoff_duration(&retry, 10), Duration::from_millis(4_000));
    }

    #[test]
    fn status_4xx_is_not_retryable() {
        assert!(!FailureKind::Status4xx.is_retryable());
        assert!(FailureKind::Status429.is_retryable());
        assert!(FailureKind::Status5xx.is_retryable());
    }
}
