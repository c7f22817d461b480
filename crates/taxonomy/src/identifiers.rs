//! Newtype identifiers.
//!
//! The taxonomy service mixes two number spaces: the stable public taxonomy
//! codes printed in the ECCAIRS documentation (e.g. `431` for "Event phase")
//! and the service's internal ids, which change between taxonomy versions.
//! Wrapping each in its own newtype prevents passing one where the other is
//! expected even though both are plain integers on the wire.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for integer-wrapped newtypes.
// Generates: struct (Copy), new(), get(), From<inner>, Display.
// ---------------------------------------------------------------------------
macro_rules! int_id {
    (
        $(#[$attr:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

int_id! {
    /// Public ECCAIRS taxonomy code of an attribute or entity.
    ///
    /// Stable across taxonomy versions. For attribute `A-431` the code is `431`;
    /// for entity `E-24` ("Occurrence") it is `24`.
    TaxonomyCode(u32)
}

int_id! {
    /// Internal identifier the taxonomy service assigns to a tree node.
    ///
    /// Only meaningful for the taxonomy version it was resolved against.
    InternalId(i64)
}

int_id! {
    /// Internal identifier of a taxonomy version (e.g. the id behind `5.1.1.2`).
    VersionId(i64)
}

int_id! {
    /// Public identifier of a single selectable value in an attribute's value list.
    ValueId(i64)
}
