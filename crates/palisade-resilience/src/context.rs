//! Error-context wrapper
//!
//! Scopes an operation so that whatever error escapes it is tagged with the
//! operation name, with the original error preserved as source. An error that
//! is already a [`ContextError`] passes through untouched; wrapping is never
//! applied twice.

use std::error::Error as StdError;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, error};

/// Boxed error type accepted by the context wrappers
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// An error annotated with the operation that produced it
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct ContextError {
    operation: String,
    #[source]
    source: BoxError,
}

impl ContextError {
    /// Create a context error wrapping `source`
    pub fn new(operation: impl Into<String>, source: BoxError) -> Self {
        Self {
            operation: operation.into(),
            source,
        }
    }

    /// The operation this error is tagged with
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Take back the original error
    pub fn into_source(self) -> BoxError {
        self.source
    }
}

/// Tag `err` with `operation`, unless it already carries a context
fn annotate(operation: &str, err: BoxError) -> ContextError {
    match err.downcast::<ContextError>() {
        // Already annotated: the original instance passes through unchanged
        Ok(inner) => *inner,
        Err(other) => ContextError::new(operation, other),
    }
}

/// Run a fallible operation, translating its error into a [`ContextError`]
pub fn error_context<T, F>(operation: &str, run: F) -> Result<T, ContextError>
where
    F: FnOnce() -> Result<T, BoxError>,
{
    debug!(operation, "starting");
    match run() {
        Ok(value) => {
            debug!(operation, "completed");
            Ok(value)
        }
        Err(err) => Err(annotate(operation, err)),
    }
}

/// Async variant of [`error_context`]
pub async fn error_context_async<T, Fut>(operation: &str, fut: Fut) -> Result<T, ContextError>
where
    Fut: Future<Output = Result<T, BoxError>>,
{
    debug!(operation, "starting");
    match fut.await {
        Ok(value) => {
            debug!(operation, "completed");
            Ok(value)
        }
        Err(err) => Err(annotate(operation, err)),
    }
}

/// Like [`error_context`], but failures are logged and suppressed
///
/// Returns `None` instead of propagating; for callers that treat the
/// operation as optional.
pub fn error_context_silenced<T, F>(operation: &str, run: F) -> Option<T>
where
    F: FnOnce() -> Result<T, BoxError>,
{
    match run() {
        Ok(value) => Some(value),
        Err(err) => {
            let err = annotate(operation, err);
            error!(operation, error = %err, "suppressed failure");
            None
        }
    }
}

/// Async variant of [`error_context_silenced`]
pub async fn error_context_async_silenced<T, Fut>(operation: &str, fut: Fut) -> Option<T>
where
    Fut: Future<Output = Result<T, BoxError>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(err) => {
            let err = annotate(operation, err);
            error!(operation, error = %err, "suppressed failure");
            None
        }
    }
}
