//
//  cloud-databases
//  api/retry.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Retry policy with exponential backoff and jitter.

use std::time::Duration;

use rand::Rng;

use crate::api::common::{ApiError, Envelope, ErrorKind};

/// HTTP statuses that schedule another attempt.
pub const RETRIABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Exponential backoff between attempts.
///
/// The delay before retry `n` (0-based) is `base * factor^n`, capped at
/// `max`, then scaled by a random factor in `1 ± jitter`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    /// The initial backoff duration.
    pub base: Duration,
    /// The multiplicative factor for each subsequent retry.
    pub factor: f64,
    /// The maximum duration to wait between attempts.
    pub max: Duration,
    /// Fraction of the delay applied as random jitter (0.25 = ±25%).
    pub jitter: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            factor: 2.0,
            max: Duration::from_secs(30),
            jitter: 0.25,
        }
    }
}

impl Backoff {
    /// Calculate the delay for a given retry (0-based).
    pub fn delay(self, retry: u32) -> Duration {
        let scale = self.factor.powi(retry.min(i32::MAX as u32) as i32);
        let seconds = (self.base.as_secs_f64() * scale).min(self.max.as_secs_f64());

        let seconds = if self.jitter > 0.0 {
            let offset = rand::rng().random_range(-self.jitter..=self.jitter);
            (seconds * (1.0 + offset)).min(self.max.as_secs_f64())
        } else {
            seconds
        };

        Duration::from_secs_f64(seconds.max(0.0))
    }
}

/// Configuration for the automatic retry mechanism.
///
/// `max_attempts` counts every attempt including the first one; `0` and `1`
/// both mean "send once". A non-zero `max_elapsed` bounds the total time
/// spent across attempts and sleeps.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub max_elapsed: Duration,
    /// Timeout applied to each individual attempt.
    pub attempt_timeout: Option<Duration>,
    pub backoff: Backoff,
    /// Error statuses that schedule another attempt.
    pub retry_statuses: Vec<u16>,
    /// Retry a 2xx response whose body could not be decoded.
    pub retry_on_response_processing: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            max_elapsed: Duration::ZERO,
            attempt_timeout: None,
            backoff: Backoff::default(),
            retry_statuses: RETRIABLE_STATUSES.to_vec(),
            retry_on_response_processing: false,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, max_elapsed: Duration) -> Self {
        Self {
            max_attempts,
            max_elapsed,
            ..Self::default()
        }
    }

    /// Disable retries.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn with_retry_on_response_processing(mut self, enabled: bool) -> Self {
        self.retry_on_response_processing = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Total number of attempts a call may make.
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn is_retriable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Check if a failed attempt should be retried.
    ///
    /// Transport failures always are; server errors only for the configured
    /// statuses; undecodable bodies only when enabled. Every other kind
    /// aborts the call.
    pub fn is_retriable(&self, err: &ApiError) -> bool {
        match err.kind() {
            ErrorKind::Transport => true,
            ErrorKind::ServerError => self.is_retriable_status(err.status()),
            ErrorKind::ResponseProcessing => self.retry_on_response_processing,
            _ => false,
        }
    }

    /// Delay before retry `retry` (0-based).
    ///
    /// A server-provided `Retry-After` replaces the computed backoff but is
    /// still capped at the backoff maximum.
    pub fn next_delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(wait) => wait.min(self.backoff.max),
            None => self.backoff.delay(retry),
        }
    }

    /// Returns `true` if a sleep ending at `elapsed` is within the time budget.
    pub fn within_budget(&self, elapsed: Duration) -> bool {
        self.max_elapsed.is_zero() || elapsed <= self.max_elapsed
    }
}

/// Parses a `Retry-After` header given in seconds.
pub fn retry_after(response: &Envelope) -> Option<Duration> {
    response
        .header("retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn test_exponential_backoff() {
        let backoff = Backoff {
            jitter: 0.0,
            ..Backoff::default()
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(500));
        assert_eq!(backoff.delay(1), Duration::from_millis(1000));
        assert_eq!(backoff.delay(2), Duration::from_millis(2000));
        assert_eq!(backoff.delay(10), Duration::from_secs(30)); // capped
    }

    #[test]
    fn test_backoff_jitter_bounds() {
        let backoff = Backoff::default();

        for _ in 0..20 {
            for retry in 0..4 {
                let expected = (500.0 * 2_f64.powi(retry as i32)).min(30_000.0);
                let delay_ms = backoff.delay(retry).as_secs_f64() * 1000.0;
                assert!(delay_ms >= expected * 0.749, "retry={retry}, delay_ms={delay_ms}");
                assert!(delay_ms <= expected * 1.251, "retry={retry}, delay_ms={delay_ms}");
            }
        }
    }

    #[test]
    fn test_default_policy_is_disabled() {
        let policy = RetryPolicy::default();

        assert!(!policy.is_enabled());
        assert_eq!(policy.total_attempts(), 1);
        for status in [429, 500, 502, 503, 504] {
            assert!(policy.is_retriable_status(status));
        }
        assert!(!policy.is_retriable_status(404));
        assert!(!policy.is_retriable_status(501));
    }

    #[test]
    fn test_error_classification() {
        let policy = RetryPolicy::new(3, Duration::ZERO);

        assert!(policy.is_retriable(&ApiError::transport("reset", None)));
        assert!(!policy.is_retriable(&ApiError::validation("id")));
        assert!(!policy.is_retriable(&ApiError::authentication("no token", None)));

        let not_found = ApiError::from_response(Envelope::new(404, HeaderMap::new(), Bytes::new()));
        assert!(!policy.is_retriable(&not_found));
        let unavailable = ApiError::from_response(Envelope::new(503, HeaderMap::new(), Bytes::new()));
        assert!(policy.is_retriable(&unavailable));
    }

    #[test]
    fn test_response_processing_retry_is_opt_in() {
        let cause = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err = ApiError::response_processing(cause, Envelope::new(200, HeaderMap::new(), Bytes::from_static(b"{")));

        let policy = RetryPolicy::new(3, Duration::ZERO);
        assert!(!policy.retry_on_response_processing);
        assert!(!policy.is_retriable(&err));
        assert!(policy.with_retry_on_response_processing(true).is_retriable(&err));
    }

    #[test]
    fn test_retry_after_overrides_backoff() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("2"));
        let env = Envelope::new(429, headers, Bytes::new());

        let policy = RetryPolicy::new(3, Duration::ZERO);
        let wait = retry_after(&env);
        assert_eq!(wait, Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(0, wait), Duration::from_secs(2));
        assert_eq!(
            policy.next_delay(0, Some(Duration::from_secs(120))),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_elapsed_budget() {
        let unbounded = RetryPolicy::new(3, Duration::ZERO);
        assert!(unbounded.within_budget(Duration::from_secs(3600)));

        let bounded = RetryPolicy::new(3, Duration::from_secs(1));
        assert!(bounded.within_budget(Duration::from_millis(900)));
        assert!(!bounded.within_budget(Duration::from_millis(1100)));
    }
}
