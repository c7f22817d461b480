//! Decoder for the taxonomy service's standard response envelope.
//!
//! Every endpoint wraps its payload as
//! `{ "data": ..., "returnCode": "...", "errorDetails": "..." }`. The payload
//! shape differs per endpoint, so `data` is kept as an untyped document and
//! queried with JSON Pointer paths by the caller.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::TaxonomyError;

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Endpoint-specific payload.
    pub data: Value,
    #[serde(default)]
    pub return_code: Option<String>,
    #[serde(default)]
    pub error_details: Option<String>,
    #[serde(skip)]
    context: String,
}

impl ResponseEnvelope {
    /// Decodes a raw response body. `context` names the endpoint and is
    /// carried into any later [`TaxonomyError::MalformedResponse`].
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::MalformedResponse`] if `raw` is not JSON or has
    /// no `data` field.
    pub fn decode(raw: &str, context: impl Into<String>) -> Result<Self, TaxonomyError> {
        let context = context.into();
        let mut envelope: Self =
            serde_json::from_str(raw).map_err(|e| TaxonomyError::malformed(&context, e))?;
        if let Some(details) = envelope.error_details.as_deref().filter(|d| !d.is_empty()) {
            tracing::debug!(
                context = %context,
                return_code = ?envelope.return_code,
                error_details = %details,
                "Taxonomy service reported error details"
            );
        }
        envelope.context = context;
        Ok(envelope)
    }

    /// The endpoint this envelope was decoded from.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Looks up a value in `data` by JSON Pointer (e.g. `/attributeValueList/levels`).
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        self.data.pointer(path)
    }

    /// Deserialises the value at `path`, which must be present.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::MalformedResponse`] if the path is absent or
    /// the value has the wrong shape.
    pub fn extract<T: DeserializeOwned>(&self, path: &str) -> Result<T, TaxonomyError> {
        self.extract_optional(path)?
            .ok_or_else(|| TaxonomyError::malformed(&self.context, format!("missing '{path}'")))
    }

    /// Deserialises the value at `path`, returning `None` if it is absent or null.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::MalformedResponse`] if the value is present but
    /// has the wrong shape.
    pub fn extract_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, TaxonomyError> {
        match self.pointer(path) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|e| TaxonomyError::malformed(&self.context, format!("'{path}': {e}"))),
        }
    }
}
