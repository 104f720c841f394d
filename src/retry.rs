//! Retry strategies and predicates for transient failures.
//!
//! Webflow rate limits aggressively, so the client retries 429 responses as
//! well as connection failures and 5xx responses. The strategy decides how
//! long to wait and how many times to try; the predicate decides which
//! failures are worth another attempt.

use crate::Error;
use http::StatusCode;
use rand::Rng;
use std::time::Duration;

/// Defines how long to wait between attempts and when to give up.
///
/// Every strategy carries an explicit cap, so a request is never retried
/// indefinitely.
///
/// # Examples
///
/// ```
/// use webflow::RetryStrategy;
/// use std::time::Duration;
///
/// // Exponential backoff: 100ms, 200ms, 400ms, 800ms...
/// let exponential = RetryStrategy::ExponentialBackoff {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(30),
///     max_retries: 5,
///     jitter: true,
/// };
///
/// // Near-zero backoff, handy in tests.
/// let fast = RetryStrategy::Custom {
///     delay_fn: |_attempt| Duration::from_millis(1),
///     max_retries: 3,
/// };
/// assert_eq!(fast.max_retries(), 3);
/// ```
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// Do not retry failed requests.
    None,

    /// Retry with exponentially increasing delays.
    ///
    /// Each retry waits for `initial_delay * 2^(attempt - 1)` (capped at `max_delay`).
    ExponentialBackoff {
        /// The delay before the first retry.
        initial_delay: Duration,
        /// The maximum delay between retries.
        max_delay: Duration,
        /// The maximum number of retries after the first attempt.
        max_retries: usize,
        /// Whether to scale each delay by a random factor in `[0.5, 1.0]`.
        jitter: bool,
    },

    /// Retry with a fixed delay between attempts.
    Linear {
        /// The delay between attempts.
        delay: Duration,
        /// The maximum number of retries after the first attempt.
        max_retries: usize,
    },

    /// Caller-supplied backoff function.
    Custom {
        /// Takes the retry number (1 = first retry) and returns the delay
        /// before it.
        delay_fn: fn(attempt: usize) -> Duration,
        /// The maximum number of retries after the first attempt.
        max_retries: usize,
    },
}

/// Retries allowed by the default strategy (10 attempts in total).
pub const DEFAULT_MAX_RETRIES: usize = 9;

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: DEFAULT_MAX_RETRIES,
            jitter: true,
        }
    }
}

impl RetryStrategy {
    /// Returns the delay before the given retry, or `None` if retries are exhausted.
    ///
    /// `attempt` is 1-indexed: 1 is the first retry.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        if attempt > self.max_retries() {
            return None;
        }

        match self {
            RetryStrategy::None => None,
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                jitter,
                ..
            } => {
                let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1) as u32);
                let base_delay =
                    initial_delay.saturating_mul(multiplier.try_into().unwrap_or(u32::MAX));
                let delay = base_delay.min(*max_delay);

                if *jitter {
                    let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(jitter_factor))
                } else {
                    Some(delay)
                }
            }
            RetryStrategy::Linear { delay, .. } => Some(*delay),
            RetryStrategy::Custom { delay_fn, .. } => Some(delay_fn(attempt)),
        }
    }

    /// Returns the maximum number of retries after the first attempt.
    pub fn max_retries(&self) -> usize {
        match self {
            RetryStrategy::None => 0,
            RetryStrategy::ExponentialBackoff { max_retries, .. }
            | RetryStrategy::Linear { max_retries, .. }
            | RetryStrategy::Custom { max_retries, .. } => *max_retries,
        }
    }
}

/// Decides whether a failed request should be tried again.
///
/// # Examples
///
/// ```
/// use webflow::{Error, RetryPredicate};
///
/// struct OnlyFirstRetry;
///
/// impl RetryPredicate for OnlyFirstRetry {
///     fn should_retry(&self, error: &Error, attempt: usize) -> bool {
///         attempt == 1 && error.is_retryable()
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if the request should be retried.
    ///
    /// `attempt` is the number of the attempt that just failed (1-indexed).
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retry everything [`Error::is_retryable`] accepts. This is the default.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnRetryable;

impl RetryPredicate for RetryOnRetryable {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Retry only on 5xx server errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOn5xx;

impl RetryPredicate for RetryOn5xx {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.status().is_some_and(|s| s.is_server_error())
    }
}

/// Retry only on HTTP 429 Too Many Requests.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnRateLimit;

impl RetryPredicate for RetryOnRateLimit {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.status() == Some(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// Retry only on timeout errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTimeout;

impl RetryPredicate for RetryOnTimeout {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Timeout)
    }
}

/// Retry only on network/connection errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnConnectionError;

impl RetryPredicate for RetryOnConnectionError {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Network(_))
    }
}

/// Retries if ANY of the wrapped predicates would.
///
/// # Examples
///
/// ```
/// use webflow::retry::{OrPredicate, RetryOnRateLimit, RetryOnTimeout};
///
/// let predicate = OrPredicate::new(vec![
///     Box::new(RetryOnRateLimit),
///     Box::new(RetryOnTimeout),
/// ]);
/// ```
pub struct OrPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl OrPredicate {
    /// Creates a new `OrPredicate` from a list of predicates.
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for OrPredicate {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self.predicates
            .iter()
            .any(|p| p.should_retry(error, attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorResponse;

    fn api_error(status: StatusCode) -> Error {
        Error::Api {
            status,
            message: String::new(),
            response: ErrorResponse::default(),
            rate_limit_info: None,
        }
    }

    #[test]
    fn test_exponential_backoff_delays() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            max_retries: 5,
            jitter: false,
        };

        assert_eq!(
            strategy.delay_for_attempt(1),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            strategy.delay_for_attempt(2),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            strategy.delay_for_attempt(3),
            Some(Duration::from_millis(400))
        );
        assert_eq!(
            strategy.delay_for_attempt(5),
            Some(Duration::from_millis(1600))
        );
        assert_eq!(strategy.delay_for_attempt(6), None);
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            max_retries: 10,
            jitter: false,
        };

        assert_eq!(strategy.delay_for_attempt(8), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            max_retries: 3,
            jitter: true,
        };

        for _ in 0..20 {
            let delay = strategy.delay_for_attempt(2).unwrap();
            assert!(delay >= Duration::from_millis(100) && delay <= Duration::from_millis(200));
        }
    }

    #[test]
    fn test_linear_delays() {
        let strategy = RetryStrategy::Linear {
            delay: Duration::from_secs(1),
            max_retries: 3,
        };

        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(3), Some(Duration::from_secs(1)));
        assert_eq!(strategy.delay_for_attempt(4), None);
    }

    #[test]
    fn test_custom_backoff_respects_cap() {
        let strategy = RetryStrategy::Custom {
            delay_fn: |attempt| Duration::from_millis(attempt as u64),
            max_retries: 2,
        };

        assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_millis(1)));
        assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(2)));
        assert_eq!(strategy.delay_for_attempt(3), None);
    }

    #[test]
    fn test_no_retry() {
        let strategy = RetryStrategy::None;
        assert_eq!(strategy.delay_for_attempt(1), None);
        assert_eq!(strategy.max_retries(), 0);
    }

    #[test]
    fn test_default_strategy_allows_ten_attempts() {
        let strategy = RetryStrategy::default();
        assert_eq!(strategy.max_retries(), 9);
        assert!(strategy.delay_for_attempt(9).is_some());
        assert!(strategy.delay_for_attempt(10).is_none());
    }

    #[test]
    fn test_predicates() {
        let rate_limited = api_error(StatusCode::TOO_MANY_REQUESTS);
        let unavailable = api_error(StatusCode::SERVICE_UNAVAILABLE);
        let not_found = api_error(StatusCode::NOT_FOUND);

        assert!(RetryOnRateLimit.should_retry(&rate_limited, 1));
        assert!(!RetryOnRateLimit.should_retry(&unavailable, 1));
        assert!(RetryOn5xx.should_retry(&unavailable, 1));
        assert!(!RetryOn5xx.should_retry(&rate_limited, 1));
        assert!(RetryOnRetryable.should_retry(&rate_limited, 1));
        assert!(!RetryOnRetryable.should_retry(&not_found, 1));
        assert!(RetryOnTimeout.should_retry(&Error::Timeout, 1));
        assert!(!RetryOnConnectionError.should_retry(&Error::Timeout, 1));

        let either = OrPredicate::new(vec![Box::new(RetryOn5xx), Box::new(RetryOnTimeout)]);
        assert!(either.should_retry(&unavailable, 1));
        assert!(either.should_retry(&Error::Timeout, 1));
        assert!(!either.should_retry(&not_found, 1));
    }
}
