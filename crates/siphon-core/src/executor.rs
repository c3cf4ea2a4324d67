//! Retry executor: drives a single logical HTTP operation to completion.
//!
//! One call to [`RetryExecutor::execute`] wraps up to `max_attempts` network
//! calls. Statuses below 400 return immediately; 429, 408, and 5xx retry
//! under exponential backoff, honoring a parseable `Retry-After` hint over
//! the computed delay; every other status is fatal on first sight. Transport
//! faults (timeouts, connection failures) retry under the same schedule.
//!
//! Every attempt emits one structured tracing event. That is a side effect
//! only; control flow never depends on it.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::RunContext;
use crate::error::{AttemptFault, TransferError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::retry::{JitterSource, RetryPolicy, UniformJitter};

/// Statuses worth another attempt: rate limiting, request timeout, and any
/// server-side failure.
pub const fn retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

/// Wraps a transport with retry, backoff, and per-attempt observability.
pub struct RetryExecutor {
    client: Arc<dyn HttpClient>,
    jitter: Arc<dyn JitterSource>,
}

impl RetryExecutor {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self::with_jitter(client, Arc::new(UniformJitter))
    }

    pub fn with_jitter(client: Arc<dyn HttpClient>, jitter: Arc<dyn JitterSource>) -> Self {
        Self { client, jitter }
    }

    /// Run the request until it yields a satisfying response, a fatal status,
    /// or the policy's attempt budget runs out.
    ///
    /// The last observed fault rides along in the terminal error; it is never
    /// swallowed.
    pub async fn execute(
        &self,
        request: &HttpRequest,
        policy: &RetryPolicy,
        ctx: &RunContext,
    ) -> Result<HttpResponse, TransferError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let started = std::time::Instant::now();
            let outcome = self.client.execute(request.clone()).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let (fault, hint) = match outcome {
                Ok(response) => {
                    tracing::info!(
                        run_id = %ctx.run_id(),
                        method = %request.method,
                        url = %request.url,
                        status = response.status,
                        elapsed_ms,
                        attempt,
                        "http_request"
                    );

                    if response.status < 400 {
                        return Ok(response);
                    }

                    if !retryable_status(response.status) {
                        return Err(TransferError::FatalStatus {
                            url: request.url.clone(),
                            status: response.status,
                        });
                    }

                    let hint = response.retry_after_seconds();
                    (AttemptFault::Status(response.status), hint)
                }
                Err(error) => {
                    tracing::warn!(
                        run_id = %ctx.run_id(),
                        method = %request.method,
                        url = %request.url,
                        error = %error,
                        elapsed_ms,
                        attempt,
                        "transport_fault"
                    );

                    if !error.retryable() {
                        return Err(TransferError::Transport {
                            url: request.url.clone(),
                            source: error,
                        });
                    }

                    (AttemptFault::Transport(error), None)
                }
            };

            if attempt >= policy.max_attempts {
                return Err(TransferError::RetriesExhausted {
                    url: request.url.clone(),
                    attempts: attempt,
                    cause: fault,
                });
            }

            let delay = match hint {
                Some(seconds) => Duration::from_secs_f64(seconds),
                None => policy.backoff_delay(attempt, self.jitter.as_ref()),
            };
            tokio::time::sleep(delay).await;
        }
    }
}
