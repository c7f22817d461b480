//! HTTP transport for the ECCAIRS taxonomy service.
//!
//! Implements the [`taxonomy::TaxonomyTransport`] port with `reqwest`. Each
//! call performs exactly one attempt; the `resolver` crate decides whether to
//! retry based on the [`taxonomy::RetryPolicy`] of the returned error.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection handling, TLS, headers and status mapping
//! live here. The [`taxonomy`] crate sees only [`taxonomy::TaxonomyTransport`].
//!
//! ## Failure classification
//!
//! | Failure | [`TransportError`] variant | Retried |
//! |---------|----------------------------|---------|
//! | Host unreachable, connection refused, connect timeout | `Connect` | yes |
//! | Any status other than 200 | `Status` | no |
//! | Read timeout, broken or undecodable body | `Request` | no |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use taxonomy::{Method, TaxonomyError, TaxonomyTransport, TransportError, TransportRequest};

const APPLICATION_JSON: &str = "application/json";

/// Timeouts applied by [`HttpTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// Limit on establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Limit on the whole request, from connecting to reading the body.
    pub request_timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// [`TaxonomyTransport`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::ConfigurationError`] if the HTTP client cannot
    /// be built (e.g. the TLS backend fails to initialise).
    pub fn new(config: HttpTransportConfig) -> Result<Self, TaxonomyError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(concat!("eccairs-taxonomy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TaxonomyError::ConfigurationError {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TaxonomyTransport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: &TransportRequest) -> Result<String, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .header(ACCEPT, APPLICATION_JSON);
        let builder = match &request.body {
            Some(body) => builder.header(CONTENT_TYPE, APPLICATION_JSON).json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| classify(&request.url, &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(status = status.as_u16(), "Non-success response");
            return Err(TransportError::Status {
                url: request.url.clone(),
                status_code: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| TransportError::Request {
            url: request.url.clone(),
            reason: describe(&e),
        })?;
        tracing::trace!(bytes = body.len(), "Received response");
        Ok(body)
    }
}

fn classify(url: &str, err: &reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connect {
            url: url.to_owned(),
            reason: describe(err),
        }
    } else {
        TransportError::Request {
            url: url.to_owned(),
            reason: describe(err),
        }
    }
}

/// Flattens the error chain; reqwest's top-level message omits the cause.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
