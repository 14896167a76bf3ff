//! The symbol interpretation graph.
//!
//! Candidate interpretations ([`Inter`]) of one region are nodes of an
//! [`InterGraph`]; [`Relation`]s between them are directed, weighted edges.
//! Once every candidate is in, [`InterGraph::reduce`] resolves exclusions
//! into a consistent set of survivors.
//!
//! Relations come from two places: [`RelationDeriver`] adds exclusions
//! between candidates competing for the same ink, and [`ConnectorFinder`]
//! links brackets across staves through connector interpretations.

mod connector;
mod deriver;
mod graph;
mod inter;
mod reduction;
mod relation;

pub use connector::{BracketConnection, ConnectorFinder};
pub use deriver::RelationDeriver;
pub use graph::{Edge, InterGraph};
pub use inter::{Inter, InterId, InterOrigin, InterState};
pub use reduction::{Conflict, ReductionReport};
pub use relation::{Relation, RelationId, RelationKind};
