//! Cancellation utilities
//!
//! Provides first-class cancellation handles and deadlines for in-flight
//! requests. Dropping the request future closes the underlying HTTP
//! connection.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. Futures observing this handle stop as soon as
    /// possible and resolve to [`LlmError::Cancelled`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// A child handle, cancelled together with this one but cancellable on
    /// its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}

/// Run `future` until it completes or `handle` is cancelled.
pub async fn run_cancellable<F, T>(handle: &CancelHandle, future: F) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    if handle.is_cancelled() {
        return Err(LlmError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = handle.cancelled() => Err(LlmError::Cancelled),
        result = future => result,
    }
}

/// Run `future` with an optional deadline.
pub async fn run_with_timeout<F, T>(timeout: Option<Duration>, future: F) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| LlmError::TimeoutError(format!("no response within {limit:?}")))?,
        None => future.await,
    }
}
