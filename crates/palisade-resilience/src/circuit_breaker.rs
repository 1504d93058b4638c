//! Circuit breaker
//!
//! Classic three-state breaker: Closed (normal operation), Open (failing
//! fast), HalfOpen (probing recovery). The Open→HalfOpen transition is
//! evaluated lazily at decision points via [`CircuitBreaker::evaluate`]; no
//! background task is involved.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Normal operation, calls allowed
    Closed,
    /// Failing fast, calls rejected without executing
    Open,
    /// Probing recovery, calls allowed until the success quota is met
    HalfOpen,
}

/// Error returned by [`CircuitBreaker::call`]
#[derive(Debug, Error)]
pub enum CircuitError<E> {
    /// Rejected before execution; the protected operation was not invoked
    #[error("circuit breaker '{0}' is open")]
    Open(String),

    /// The protected operation itself failed; the original error is carried
    /// unchanged
    #[error("{0}")]
    Inner(E),
}

impl<E> CircuitError<E> {
    /// Extract the original operation error, if any
    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitError::Open(_) => None,
            CircuitError::Inner(e) => Some(e),
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    half_open_successes: u32,
    last_failure_time: Option<Instant>,
}

/// Failure-tracking state machine guarding one external dependency
///
/// Construct one breaker per logical resource and share it (`Clone` clones
/// the handle, not the state). Counters are guarded by a single mutex so
/// every transition is atomic under concurrent callers.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    reset_timeout: Duration,
    half_open_attempts: u32,
    inner: Arc<Mutex<Inner>>,
}

impl CircuitBreaker {
    /// Create a breaker
    ///
    /// `failure_threshold`: consecutive failures while Closed before opening.
    /// `reset_timeout`: how long to stay Open before probing.
    /// `half_open_attempts`: consecutive successes required to close again.
    /// Thresholds below 1 are clamped to 1.
    pub fn new(
        name: impl Into<String>,
        failure_threshold: u32,
        reset_timeout: Duration,
        half_open_attempts: u32,
    ) -> Self {
        let name = name.into();
        info!(
            breaker = %name,
            failure_threshold,
            reset_timeout_ms = reset_timeout.as_millis() as u64,
            half_open_attempts,
            "circuit breaker initialized"
        );
        Self {
            name,
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            half_open_attempts: half_open_attempts.max(1),
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                half_open_successes: 0,
                last_failure_time: None,
            })),
        }
    }

    /// Breaker name, as used in log events and rejection errors
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the current state, applying the lazy Open→HalfOpen transition
    pub fn evaluate(&self) -> CircuitState {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::Open {
            let elapsed = inner
                .last_failure_time
                .map(|t| t.elapsed())
                .unwrap_or(Duration::MAX);
            if elapsed > self.reset_timeout {
                inner.state = CircuitState::HalfOpen;
                inner.half_open_successes = 0;
                info!(breaker = %self.name, "reset timeout elapsed, probing recovery");
            }
        }
        inner.state
    }

    /// Whether a call may proceed right now
    pub fn can_execute(&self) -> bool {
        matches!(
            self.evaluate(),
            CircuitState::Closed | CircuitState::HalfOpen
        )
    }

    /// Record a successful call
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => {
                // Any success clears progress toward the threshold
                inner.failure_count = 0;
            }
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.half_open_attempts {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.half_open_successes = 0;
                    inner.last_failure_time = None;
                    info!(breaker = %self.name, "recovered, circuit closed");
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.last_failure_time = Some(Instant::now());
                    warn!(
                        breaker = %self.name,
                        failures = inner.failure_count,
                        "failure threshold reached, circuit opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.last_failure_time = Some(Instant::now());
                warn!(breaker = %self.name, "probe failed, circuit reopened");
            }
            CircuitState::Open => {}
        }
    }

    /// Execute an operation under breaker protection
    ///
    /// Rejects with [`CircuitError::Open`] without invoking the operation
    /// when the circuit is open. The breaker observes failures, it does not
    /// swallow them: an operation error is returned unchanged inside
    /// [`CircuitError::Inner`].
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.can_execute() {
            debug!(breaker = %self.name, "rejecting call, circuit open");
            return Err(CircuitError::Open(self.name.clone()));
        }

        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitError::Inner(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn breaker(threshold: u32, timeout: Duration, half_open: u32) -> CircuitBreaker {
        CircuitBreaker::new("test", threshold, timeout, half_open)
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = breaker(3, Duration::from_secs(60), 1);
        assert_eq!(cb.evaluate(), CircuitState::Closed);

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.evaluate(), CircuitState::Closed);
        assert!(cb.can_execute());

        cb.record_failure();
        assert_eq!(cb.evaluate(), CircuitState::Open);
        assert!(!cb.can_execute());
    }

    #[test]
    fn test_success_clears_failure_count() {
        let cb = breaker(3, Duration::from_secs(60), 1);

        cb.record_failure();
        cb.record_failure();
        cb.record_success();

        // Two more failures stay below the threshold after the reset
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.evaluate(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_after_reset_timeout() {
        let cb = breaker(1, Duration::from_millis(20), 2);
        cb.record_failure();
        assert_eq!(cb.evaluate(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cb.evaluate(), CircuitState::HalfOpen);
        assert!(cb.can_execute());
    }

    #[test]
    fn test_half_open_success_quota_closes() {
        let cb = breaker(1, Duration::from_millis(10), 2);
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cb.evaluate(), CircuitState::HalfOpen);

        cb.record_success();
        assert_eq!(cb.evaluate(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.evaluate(), CircuitState::Closed);

        // Counters are back at zero: the threshold applies fresh
        cb.record_failure();
        assert_eq!(cb.evaluate(), CircuitState::Open);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let cb = breaker(1, Duration::from_millis(10), 2);
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cb.evaluate(), CircuitState::HalfOpen);

        cb.record_failure();
        assert_eq!(cb.evaluate(), CircuitState::Open);
        assert!(!cb.can_execute());
    }

    #[tokio::test]
    async fn test_call_rejects_without_invoking() {
        let cb = breaker(1, Duration::from_secs(60), 1);
        let invocations = AtomicU32::new(0);

        let result: Result<(), _> = cb
            .call(|| async {
                invocations.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("boom")
            })
            .await;
        assert!(matches!(result, Err(CircuitError::Inner("boom"))));
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        // Circuit is now open; the operation must not run again
        let result: Result<(), _> = cb
            .call(|| async {
                invocations.fetch_add(1, Ordering::SeqCst);
                Ok::<(), &str>(())
            })
            .await;
        assert!(matches!(result, Err(CircuitError::Open(_))));
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_call_success_passes_value() {
        let cb = breaker(1, Duration::from_secs(60), 1);
        let result: Result<i32, CircuitError<&str>> = cb.call(|| async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_error_display() {
        let err: CircuitError<&str> = CircuitError::Open("redis".to_string());
        assert_eq!(err.to_string(), "circuit breaker 'redis' is open");
        assert!(err.into_inner().is_none());
    }
}
