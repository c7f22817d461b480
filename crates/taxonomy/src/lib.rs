//! Domain model for the ECCAIRS taxonomy client.
//!
//! This crate contains every record, newtype identifier, and error type used
//! when resolving ECCAIRS taxonomy codes, together with the pure pieces of the
//! resolution engine: the typed taxonomy tree, the id resolution cache, and the
//! response envelope decoder. Infrastructure crates implement the
//! [`TaxonomyTransport`] port defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `transport` crate defines *how* to reach
//! the remote taxonomy service and the `resolver` crate sequences the calls.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`TaxonomyCode`, `InternalId`, `VersionId`, `ValueId`) |
//! | [`types`] | Records returned to callers (`EccairsAttribute`, `EccairsValue`, etc.) |
//! | [`errors`] | [`TaxonomyError`] and the retry-policy vocabulary |
//! | [`ports`] | The [`TaxonomyTransport`] trait and its request/error types |
//! | [`endpoints`] | URL catalogue of the taxonomy service |
//! | [`envelope`] | Decoder for the service's standard response wrapper |
//! | [`tree`] | Typed taxonomy tree and code + kind search |
//! | [`cache`] | Id resolution cache |

pub mod cache;
pub mod endpoints;
pub mod envelope;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod tree;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use cache::IdCache;
pub use endpoints::Endpoints;
pub use envelope::ResponseEnvelope;
pub use errors::{RetryPolicy, TaxonomyError};
pub use identifiers::{InternalId, TaxonomyCode, ValueId, VersionId};
pub use ports::{Method, TaxonomyTransport, TransportError, TransportRequest};
pub use tree::{TaxonomyTree, TreeNode};
pub use types::{
    EccairsAttribute, EccairsEntity, EccairsValue, NodeKind, TaxonomyVersionInfo, Timestamp,
};
