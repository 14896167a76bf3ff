//! Pattern matching over glyph pools.
//!
//! Symbol families printed in several disconnected pieces (bass clefs with
//! their two dots, repeat dot pairs) are recovered by one generic matcher
//! driven by declarative [`PatternTemplate`]s. A template names two anchors,
//! each a shape set at an expected staff pitch position, plus the tolerances
//! and search area used to build the compound around the first anchor.
//!
//! Templates are kept in a [`PatternRegistry`], in the order they run.

mod matcher;
mod registry;
mod template;

pub use matcher::{MatchOutcome, PatternMatcher};
pub use registry::PatternRegistry;
pub use template::{Anchor, PatternTemplate, SearchRegion};
