//! Error and retry-policy types for the taxonomy client.
//!
//! [`TaxonomyError`] is what every public operation returns. Transport-level
//! failures are reported by the port as [`crate::TransportError`] and mapped
//! to a [`TaxonomyError`] once the retry budget has been applied.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that
//! participates in retry decisions must be able to produce one.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{NodeKind, TaxonomyCode};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by transport error types to let the retrying layer decide whether
/// to re-issue a request.
///
/// ## Rules
///
/// - `Retryable`: the connection to the service could not be established.
/// - `NonRetryable`: everything else, including non-200 responses and
///   timeouts after the connection was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Client errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the taxonomy resolution service.
///
/// No operation returns partial results: a call either succeeds completely or
/// fails with one of these variants.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// The service could not be reached, even after retrying.
    #[error("Taxonomy service unavailable after {attempts} attempt(s): {reason}")]
    ServiceUnavailable {
        /// Total number of attempts made, including the first one.
        attempts: u32,
        /// Description of the last connection failure.
        reason: String,
    },

    /// The request reached the service but did not complete (e.g. a read
    /// timeout or an interrupted body). Never retried.
    #[error("Taxonomy service request failed: {reason}")]
    RequestFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The service answered with a status other than 200.
    #[error("Taxonomy service responded with status {status_code}")]
    ServiceError {
        /// HTTP status code returned by the service.
        status_code: u16,
    },

    /// A response was not valid JSON, lacked the envelope, or lacked a field
    /// the operation depends on.
    #[error("Malformed response from {context}: {reason}")]
    MalformedResponse {
        /// The endpoint or value being decoded.
        context: String,
        /// What was wrong with it.
        reason: String,
    },

    /// No node with the given code and kind exists in the loaded tree.
    #[error("No {kind} with taxonomy code {code} in the taxonomy tree")]
    NotFound {
        /// The code that was looked up.
        code: TaxonomyCode,
        /// The requested node kind.
        kind: NodeKind,
    },

    /// More than one tree node matched a code and kind pair.
    ///
    /// Indicates a malformed tree; a well-formed tree has unique pairs.
    #[error("Taxonomy code {code} matches {matches} {kind} nodes in the taxonomy tree")]
    AmbiguousCode {
        /// The code that was looked up.
        code: TaxonomyCode,
        /// The requested node kind.
        kind: NodeKind,
        /// Number of matching nodes.
        matches: usize,
    },

    /// The client was constructed with an unusable configuration.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },
}

impl TaxonomyError {
    /// Convenience constructor for [`TaxonomyError::MalformedResponse`].
    pub fn malformed(context: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` if the error was caused by the caller's input rather
    /// than by the service or the network.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
