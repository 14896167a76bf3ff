//! Relations between interpretations.

use std::fmt;

use petgraph::graph::EdgeIndex;
use serde::Serialize;

/// The kind of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The two interpretations cannot both survive. Symmetric.
    Exclusion,

    /// The source interpretation raises the contextual grade of the target.
    Support,

    /// Informational link, no effect on reduction.
    Connection,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exclusion => "exclusion",
            Self::Support => "support",
            Self::Connection => "connection",
        };
        f.write_str(name)
    }
}

/// Stable handle of a relation within its region graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId(EdgeIndex);

impl RelationId {
    pub(crate) fn from_edge(edge: EdgeIndex) -> Self {
        Self(edge)
    }

    /// Returns the insertion rank of the relation.
    pub fn index(self) -> usize {
        self.0.index()
    }
}

/// A weighted relation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relation {
    kind: RelationKind,
    strength: f64,
}

impl Relation {
    /// Creates a relation; the strength is clamped to `[0, 1]`.
    pub fn new(kind: RelationKind, strength: f64) -> Self {
        let strength = if strength.is_nan() {
            0.0
        } else {
            strength.clamp(0.0, 1.0)
        };
        Self { kind, strength }
    }

    /// Returns the relation kind.
    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Returns the strength in `[0, 1]`.
    pub fn strength(&self) -> f64 {
        self.strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_is_clamped() {
        assert_eq!(Relation::new(RelationKind::Support, 1.7).strength(), 1.0);
        assert_eq!(Relation::new(RelationKind::Support, -0.2).strength(), 0.0);
        assert_eq!(Relation::new(RelationKind::Support, f64::NAN).strength(), 0.0);
        assert_eq!(Relation::new(RelationKind::Exclusion, 0.4).strength(), 0.4);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RelationKind::Exclusion.to_string(), "exclusion");
        assert_eq!(RelationKind::Connection.to_string(), "connection");
    }
}
