//! Port through which the resolution engine reaches the taxonomy service.
//!
//! The `transport` crate implements [`TaxonomyTransport`] over HTTP; tests
//! implement it with in-memory doubles. Retrying is not the transport's job:
//! it reports a [`RetryPolicy`] per failure and the caller applies its own
//! retry budget.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::RetryPolicy;

/// HTTP method of a taxonomy service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// A single logical request to the taxonomy service.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method to issue.
    pub method: Method,
    /// Absolute URL including any query string.
    pub url: String,
    /// JSON body; only present for [`Method::Post`].
    pub body: Option<Value>,
}

impl TransportRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    /// Creates a POST request carrying a JSON body.
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// Failure reported by a [`TaxonomyTransport`] for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established (host unreachable, refused).
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The service responded with a non-200 status.
    #[error("{url} responded with status {status_code}")]
    Status { url: String, status_code: u16 },

    /// The request failed after the connection was made (timeout, broken body).
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl TransportError {
    /// Whether this failure may be retried. Only connection failures qualify.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Connect { .. } => RetryPolicy::Retryable { after: None },
            Self::Status { .. } | Self::Request { .. } => RetryPolicy::NonRetryable,
        }
    }
}

/// Sends one attempt of a request and returns the raw response body.
///
/// Implementations must set `Accept: application/json` on every request and
/// `Content-Type: application/json` on requests with a body, and must return
/// [`TransportError::Status`] for any status other than 200.
#[async_trait]
pub trait TaxonomyTransport: Send + Sync {
    async fn send(&self, request: &TransportRequest) -> Result<String, TransportError>;
}

#[async_trait]
impl<T: TaxonomyTransport + ?Sized> TaxonomyTransport for Arc<T> {
    async fn send(&self, request: &TransportRequest) -> Result<String, TransportError> {
        (**self).send(request).await
    }
}
