//! ECCAIRS taxonomy resolution service.
//!
//! Sequences calls between the domain logic in the [`taxonomy`] crate and any
//! [`taxonomy::TaxonomyTransport`] implementation:
//!
//! - [`RetryingTransport`] applies the retry budget to connection failures and
//!   decodes the response envelope.
//! - [`ValueListBuilder`] assembles multi-level value lists.
//! - [`TaxonomyService`] owns the version/tree lifecycle and exposes the
//!   public lookups.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** No HTTP details live here; the `transport` crate
//! supplies them.

pub mod retry;
pub mod service;
pub mod values;

pub use retry::{RetrySettings, RetryingTransport};
pub use service::TaxonomyService;
pub use values::ValueListBuilder;
