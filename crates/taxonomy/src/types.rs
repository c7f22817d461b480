//! Records returned by the taxonomy resolution service.
//!
//! All records serialise with camelCase field names so that the CLI output and
//! any downstream JSON consumers see the same vocabulary as the ECCAIRS
//! taxonomy browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{InternalId, TaxonomyCode, ValueId, VersionId};

// ---------------------------------------------------------------------------
// Tree node kinds
// ---------------------------------------------------------------------------

/// Kind discriminator carried by every taxonomy tree node.
///
/// The service encodes it as a one-letter `type` field: `"A"` for attributes
/// and `"E"` for entities. Anything else (value-list headers, grouping nodes)
/// is [`NodeKind::Other`] and never matches a code lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A leaf classification field, e.g. `A-390` "Event type".
    Attribute,
    /// A structural grouping node that owns attributes, e.g. `E-24` "Occurrence".
    Entity,
    /// Any other node type present in the tree.
    Other,
}

impl NodeKind {
    /// Maps the wire discriminator to a kind.
    pub fn from_discriminator(value: &str) -> Self {
        match value {
            "A" => Self::Attribute,
            "E" => Self::Entity,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Attribute => "attribute",
            Self::Entity => "entity",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Information about the taxonomy version currently published by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyVersionInfo {
    /// Dotted version label, for example `5.1.1.2`.
    pub label: String,
    /// Service-internal identifier of this version.
    pub id: VersionId,
}

// ---------------------------------------------------------------------------
// Attributes and entities
// ---------------------------------------------------------------------------

/// ECCAIRS attribute: a leaf classification field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EccairsAttribute {
    /// Internal ECCAIRS id.
    pub id: InternalId,
    /// Taxonomy code, for example `390` for "Event type".
    pub taxonomy_code: TaxonomyCode,
    /// Human-readable label.
    pub label: String,
    /// E5X XML tag, e.g. `Event_Type`. `None` when the tree does not carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xsd_tag: Option<String>,
}

/// ECCAIRS entity: a structural node that owns zero or more attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EccairsEntity {
    /// Internal ECCAIRS id.
    pub id: InternalId,
    /// Taxonomy code, for example `24` for "Occurrence".
    pub taxonomy_code: TaxonomyCode,
    /// Human-readable label.
    pub label: String,
    /// E5X XML tag, e.g. `Occurrence`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xsd_tag: Option<String>,
}

// ---------------------------------------------------------------------------
// Value lists
// ---------------------------------------------------------------------------

/// One selectable value in an attribute's (possibly hierarchical) value list.
///
/// `children` is `None` for values the service reports as having no children
/// and `Some` (possibly empty) for values that do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EccairsValue {
    /// Public value identifier.
    pub id: ValueId,
    pub description: String,
    pub detailed_description: String,
    pub explanation: String,
    /// Level label as reported by the service, `"1"` for top-level values.
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<EccairsValue>>,
}

impl EccairsValue {
    /// Iterates over this value and all of its descendants, depth first.
    pub fn iter_depth_first(&self) -> impl Iterator<Item = &EccairsValue> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            if let Some(children) = &next.children {
                stack.extend(children.iter().rev());
            }
            Some(next)
        })
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
