//! Retrying transport.
//!
//! Wraps a [`TaxonomyTransport`] and re-issues a request while the transport
//! reports [`RetryPolicy::Retryable`], i.e. while the service cannot be
//! connected to. Non-200 responses and failures after the connection was made
//! surface immediately.
//!
//! The back-off is fixed (no exponential growth, no jitter). Waiting is a
//! `tokio` timer, so dropping the calling future cancels the wait.

use std::time::Duration;

use taxonomy::{
    ResponseEnvelope, RetryPolicy, TaxonomyError, TaxonomyTransport, TransportError,
    TransportRequest,
};

/// Retries after the first attempt before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Retry budget applied to connection failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Maximum number of retries; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// A [`TaxonomyTransport`] with a retry budget and envelope decoding.
#[derive(Debug)]
pub struct RetryingTransport<T> {
    inner: T,
    settings: RetrySettings,
}

impl<T: TaxonomyTransport> RetryingTransport<T> {
    pub fn new(inner: T, settings: RetrySettings) -> Self {
        Self { inner, settings }
    }

    /// The wrapped single-attempt transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Sends `request`, retrying connection failures.
    ///
    /// # Errors
    ///
    /// - [`TaxonomyError::ServiceUnavailable`] once the retry budget is spent.
    /// - [`TaxonomyError::ServiceError`] on a non-200 response (no retry).
    /// - [`TaxonomyError::RequestFailed`] on any other transport failure (no retry).
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn send(&self, request: &TransportRequest) -> Result<String, TaxonomyError> {
        let mut retries = 0;
        loop {
            let err = match self.inner.send(request).await {
                Ok(body) => return Ok(body),
                Err(err) => err,
            };
            match err.retry_policy() {
                RetryPolicy::Retryable { .. } if retries < self.settings.max_retries => {
                    retries += 1;
                    let delay = self.settings.delay;
                    tracing::warn!(
                        retry = retries,
                        max_retries = self.settings.max_retries,
                        delay_secs = delay.as_secs_f64(),
                        error = %err,
                        "Failed to get response, attempting again"
                    );
                    tokio::time::sleep(delay).await;
                }
                _ => return Err(give_up(err, retries + 1)),
            }
        }
    }

    /// Sends `request` and decodes the response envelope.
    ///
    /// # Errors
    ///
    /// Everything [`Self::send`] returns, plus
    /// [`TaxonomyError::MalformedResponse`] if the body is not an envelope.
    pub async fn fetch(
        &self,
        request: &TransportRequest,
        context: &str,
    ) -> Result<ResponseEnvelope, TaxonomyError> {
        let body = self.send(request).await?;
        ResponseEnvelope::decode(&body, context)
    }
}

fn give_up(err: TransportError, attempts: u32) -> TaxonomyError {
    match err {
        TransportError::Connect { url, reason } => {
            tracing::error!(%url, attempts, %reason, "Taxonomy service unreachable");
            TaxonomyError::ServiceUnavailable { attempts, reason }
        }
        TransportError::Status { url, status_code } => {
            tracing::error!(%url, status_code, "Failed to get response");
            TaxonomyError::ServiceError { status_code }
        }
        TransportError::Request { url, reason } => {
            tracing::error!(%url, %reason, "Taxonomy service request failed");
            TaxonomyError::RequestFailed { reason }
        }
    }
}
