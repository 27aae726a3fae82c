//! Retry policies for API requests
//!
//! Fetching never retries on its own; a policy decides whether a failed
//! request is attempted again and how long to wait first.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::history::error::FetchError;

/// Decides whether and when a failed request is retried
pub trait RetryPolicy: Send + Sync {
    /// Delay before retry number `attempt` (starting at 0), or `None` to
    /// give up and surface `error`.
    fn delay_for(&self, attempt: u32, error: &FetchError) -> Option<Duration>;
}

/// Surfaces every error immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn delay_for(&self, _attempt: u32, _error: &FetchError) -> Option<Duration> {
        None
    }
}

/// Exponential backoff applied to exceeded quotas only
///
/// A `Retry-After` hint from the server takes precedence over the
/// computed delay; both are capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct Backoff {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy for Backoff {
    fn delay_for(&self, attempt: u32, error: &FetchError) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let FetchError::QuotaExceeded {
            retry_after_secs, ..
        } = error
        else {
            return None;
        };

        let delay = match retry_after_secs {
            Some(secs) => Duration::from_secs(*secs),
            None => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        Some(delay.min(self.max_delay))
    }
}

/// Builds the policy described by the configuration
pub fn from_config(config: &RetryConfig) -> Box<dyn RetryPolicy> {
    if config.max_retries == 0 {
        Box::new(NoRetry)
    } else {
        Box::new(Backoff {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn quota(retry_after_secs: Option<u64>) -> FetchError {
        FetchError::QuotaExceeded {
            status: 429,
            retry_after_secs,
        }
    }

    fn backoff() -> Backoff {
        Backoff {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
        }
    }

    #[test]
    fn no_retry_never_retries() {
        assert_eq!(NoRetry.delay_for(0, &quota(Some(1))), None);
    }

    #[rstest]
    #[case(0, Some(Duration::from_millis(100)))]
    #[case(1, Some(Duration::from_millis(200)))]
    #[case(2, Some(Duration::from_millis(250)))] // capped
    #[case(3, None)] // retries exhausted
    fn backoff_grows_exponentially(#[case] attempt: u32, #[case] expected: Option<Duration>) {
        assert_eq!(backoff().delay_for(attempt, &quota(None)), expected);
    }

    #[test]
    fn backoff_honors_retry_after_within_cap() {
        let policy = Backoff {
            max_delay: Duration::from_secs(120),
            ..backoff()
        };

        assert_eq!(
            policy.delay_for(0, &quota(Some(60))),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn backoff_does_not_retry_protocol_errors() {
        let error = FetchError::Protocol {
            status: 500,
            body: String::new(),
        };

        assert_eq!(backoff().delay_for(0, &error), None);
    }

    #[test]
    fn from_config_with_zero_retries_never_retries() {
        let policy = from_config(&RetryConfig::default());

        assert_eq!(policy.delay_for(0, &quota(None)), None);
    }
}
