//! Numeric identifiers for glyphs, staves and page regions.
//!
//! Identifiers are assigned by the segmentation and staff-detection stages
//! upstream and are only compared, ordered and displayed here. Their ordering
//! is the tie-breaker wherever a deterministic processing order is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an identifier from its raw value.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw numeric value.
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a glyph, primitive or compound.
    ///
    /// # Examples
    ///
    /// ```
    /// use omrsig_core::identifier::GlyphId;
    ///
    /// let id = GlyphId::new(42);
    /// assert_eq!(id.to_string(), "#42");
    /// assert!(GlyphId::new(3) < GlyphId::new(7));
    /// ```
    GlyphId,
    "#"
);

define_id!(
    /// Identifier of a staff within a page.
    StaffId,
    "staff-"
);

define_id!(
    /// Identifier of an independent page region (typically one system).
    RegionId,
    "region-"
);
