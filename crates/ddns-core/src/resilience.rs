//! Bounded-retry request executor
//!
//! [`Retry`] decorates another [`RequestExecutor`]. A call succeeds as soon
//! as the inner executor returns a response with a status below 500;
//! transport errors and server errors are retried after a constant wait.
//! Cancellation wins over the wait, and a cancelled inner call is never
//! retried.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::transport::{ApiRequest, ApiResponse, RequestExecutor};

/// Attempts used when zero is configured
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Wait used when a zero duration is configured
pub const DEFAULT_WAIT: Duration = Duration::from_secs(1);

/// Retrying decorator around an inner executor
#[derive(Debug, Clone)]
pub struct Retry<E> {
    inner: E,
    attempts: u32,
    wait: Duration,
}

impl<E: RequestExecutor> Retry<E> {
    /// Wrap `inner`, normalizing `attempts == 0` to 3 and a zero `wait` to one second
    pub fn new(inner: E, attempts: u32, wait: Duration) -> Self {
        let attempts = if attempts == 0 {
            DEFAULT_ATTEMPTS
        } else {
            attempts
        };
        let wait = if wait.is_zero() { DEFAULT_WAIT } else { wait };

        Self {
            inner,
            attempts,
            wait,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: RequestExecutor> RequestExecutor for Retry<E> {
    async fn execute(
        &self,
        request: &ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            let failure = match self.inner.execute(request, cancel).await {
                Ok(response) if !response.is_server_error() => {
                    if attempt > 1 {
                        debug!(attempt, url = %request.url, "Request succeeded after retry");
                    }
                    return Ok(response);
                }
                Ok(response) => Error::Server {
                    status: response.status,
                },
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => e,
            };

            warn!(
                attempt,
                attempts = self.attempts,
                url = %request.url,
                error = %failure,
                "Request attempt failed"
            );
            last_error = Some(failure);

            if attempt < self.attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                    _ = tokio::time::sleep(self.wait) => {}
                }
            }
        }

        let source = last_error.unwrap_or_else(|| Error::transport("no attempt was made"));
        Err(Error::RetriesExhausted {
            attempts: self.attempts,
            source: Box::new(source),
        })
    }
}
