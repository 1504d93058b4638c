//! Sequential batch runner
//!
//! Runs one operation over an ordered sequence of items, isolating per-item
//! failures. Items are processed strictly in order and never in parallel;
//! parallelizing is a caller decision.

use std::future::Future;
use tracing::warn;

/// Outcome of a batch run
///
/// `successes` holds results in item order; `failures` pairs each failing
/// item with the error it produced, unwrapped.
#[derive(Debug)]
pub struct BatchReport<I, T, E> {
    pub successes: Vec<T>,
    pub failures: Vec<(I, E)>,
}

impl<I, T, E> BatchReport<I, T, E> {
    /// Whether every item succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run `op` over `items` sequentially
///
/// With `continue_on_error`, every item is attempted and each failure is
/// recorded. Without it, processing stops at the first failure: `successes`
/// holds only results from before the failing item, `failures` holds exactly
/// that one entry, and later items are never attempted.
pub async fn run_batch<I, T, E, F, Fut>(
    items: impl IntoIterator<Item = I>,
    mut op: F,
    continue_on_error: bool,
) -> BatchReport<I, T, E>
where
    I: Clone,
    F: FnMut(I) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut successes = Vec::new();
    let mut failures = Vec::new();

    for item in items {
        match op(item.clone()).await {
            Ok(result) => successes.push(result),
            Err(err) => {
                warn!(error = %err, continue_on_error, "batch item failed");
                failures.push((item, err));
                if !continue_on_error {
                    break;
                }
            }
        }
    }

    BatchReport {
        successes,
        failures,
    }
}
