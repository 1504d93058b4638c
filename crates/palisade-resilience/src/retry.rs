//! Retry with exponential backoff
//!
//! Two executors over the same policy: [`retry`] suspends between attempts
//! (`tokio::time::sleep`) and [`retry_blocking`] blocks the calling thread.
//! The inter-attempt wait is scoped to the one call; no background work is
//! spawned.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Bounded-attempt backoff policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (≥ 1)
    pub attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Factor applied to the delay after each wait
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    ///
    /// `attempts` below 1 is clamped to 1; `backoff_multiplier` below 1.0
    /// (including NaN) is clamped to 1.0, keeping the delay arithmetic
    /// panic-free.
    pub fn new(attempts: u32, initial_delay: Duration, backoff_multiplier: f64) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_delay,
            backoff_multiplier: backoff_multiplier.max(1.0),
        }
    }
}

/// Terminal failure of a retried operation
#[derive(Debug, Error)]
pub enum RetryFailure<E> {
    /// Every attempt failed; carries the error from the final attempt
    #[error("'{operation}' failed after {attempts} attempts: {cause}")]
    Exhausted {
        operation: String,
        attempts: u32,
        cause: E,
    },

    /// The operation failed with an error the policy does not retry; the
    /// original error propagates immediately, remaining attempts are skipped
    #[error("{0}")]
    NotRetryable(E),
}

impl<E> RetryFailure<E> {
    /// The underlying operation error
    pub fn into_cause(self) -> E {
        match self {
            RetryFailure::Exhausted { cause, .. } => cause,
            RetryFailure::NotRetryable(cause) => cause,
        }
    }
}

/// Retry an async operation with exponential backoff
///
/// Attempts run sequentially; after a retryable failure the executor sleeps
/// for the current delay and multiplies it by the policy's backoff factor.
/// Each failed attempt is logged with its attempt number and the computed
/// delay.
pub async fn retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &str,
    is_retryable: P,
    mut run: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match run().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retryable(&err) => {
                warn!(operation, attempt, error = %err, "non-retryable failure");
                return Err(RetryFailure::NotRetryable(err));
            }
            Err(err) => {
                if attempt >= attempts {
                    warn!(operation, attempt, error = %err, "attempts exhausted");
                    return Err(RetryFailure::Exhausted {
                        operation: operation.to_string(),
                        attempts,
                        cause: err,
                    });
                }
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(policy.backoff_multiplier);
            }
        }
    }
}

/// Blocking variant of [`retry`] for synchronous call sites
///
/// Identical semantics, but the inter-attempt wait is a thread sleep. Do not
/// use inside an async task.
pub fn retry_blocking<T, E, F, P>(
    policy: &RetryPolicy,
    operation: &str,
    is_retryable: P,
    mut run: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match run() {
            Ok(value) => return Ok(value),
            Err(err) if !is_retryable(&err) => {
                warn!(operation, attempt, error = %err, "non-retryable failure");
                return Err(RetryFailure::NotRetryable(err));
            }
            Err(err) => {
                if attempt >= attempts {
                    warn!(operation, attempt, error = %err, "attempts exhausted");
                    return Err(RetryFailure::Exhausted {
                        operation: operation.to_string(),
                        attempts,
                        cause: err,
                    });
                }
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "attempt failed, backing off"
                );
                std::thread::sleep(delay);
                delay = delay.mul_f64(policy.backoff_multiplier);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1), 2.0)
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry(
            &fast_policy(3),
            "flaky",
            |_: &&str| true,
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err("transient") } else { Ok(n) }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_cause() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(
            &fast_policy(3),
            "doomed",
            |_: &String| true,
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(format!("failure #{n}"))
            },
        )
        .await;

        match result.unwrap_err() {
            RetryFailure::Exhausted {
                attempts, cause, ..
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(cause, "failure #3");
            }
            other => panic!("expected Exhausted, got {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_propagates_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry(
            &fast_policy(5),
            "fatal",
            |e: &&str| *e != "fatal",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("fatal")
            },
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            RetryFailure::NotRetryable("fatal")
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backoff_delays_accumulate() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), 2.0);
        let start = Instant::now();
        let result: Result<(), _> = retry(&policy, "slow", |_: &&str| true, || async {
            Err("nope")
        })
        .await;

        assert!(result.is_err());
        // Two waits: 10ms then 20ms
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn test_blocking_variant() {
        let calls = AtomicU32::new(0);
        let result = retry_blocking(&fast_policy(2), "flaky", |_: &&str| true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 2 { Err("transient") } else { Ok("done") }
        });

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_degenerate_multiplier_clamped() {
        assert_eq!(
            RetryPolicy::new(3, Duration::from_millis(1), -4.0).backoff_multiplier,
            1.0
        );
        assert_eq!(
            RetryPolicy::new(3, Duration::from_millis(1), f64::NAN).backoff_multiplier,
            1.0
        );

        // All attempts run without the delay arithmetic panicking
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1), -4.0);
        let result: Result<(), _> = retry_blocking(&policy, "doomed", |_: &&str| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("boom")
        });
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_blocking(
            &RetryPolicy::new(0, Duration::from_millis(1), 2.0),
            "once",
            |_: &&str| true,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom")
            },
        );

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
