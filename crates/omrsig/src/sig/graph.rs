//! The per-region interpretation graph.

use log::trace;
use petgraph::{Direction, graph::DiGraph, visit::EdgeRef};

use omrsig_core::identifier::RegionId;

use crate::{config::ReductionConfig, error::SigError};

use super::{
    inter::{Inter, InterId},
    reduction::{self, ReductionReport},
    relation::{Relation, RelationId, RelationKind},
};

/// One relation, as listed by [`InterGraph::edges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub id: RelationId,
    pub source: InterId,
    pub target: InterId,
    pub relation: Relation,
}

/// Interpretations of one region and the relations between them.
///
/// The graph is an arena: interpretations and relations are addressed by
/// [`InterId`] and [`RelationId`] handles and are never deleted. Reduction
/// only flips the state of losing interpretations to removed.
#[derive(Debug, Clone)]
pub struct InterGraph {
    region: RegionId,
    graph: DiGraph<Inter, Relation>,
}

impl InterGraph {
    /// Creates an empty graph for a region.
    pub fn new(region: RegionId) -> Self {
        Self {
            region,
            graph: DiGraph::new(),
        }
    }

    /// Returns the region this graph belongs to.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Adds an interpretation and returns its handle.
    pub fn add_inter(&mut self, inter: Inter) -> InterId {
        let id = InterId::from_node(self.graph.add_node(inter));
        trace!(inter:% = id; "Inter added");
        id
    }

    /// Adds a relation from `source` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::UnknownInter`] if either handle does not belong to
    /// this graph.
    pub fn add_relation(
        &mut self,
        source: InterId,
        target: InterId,
        kind: RelationKind,
        strength: f64,
    ) -> Result<RelationId, SigError> {
        for id in [source, target] {
            if self.graph.node_weight(id.node()).is_none() {
                return Err(SigError::UnknownInter { id: id.index() });
            }
        }
        let edge = self
            .graph
            .add_edge(source.node(), target.node(), Relation::new(kind, strength));
        trace!(source:% = source, target:% = target, kind:% = kind; "Relation added");
        Ok(RelationId::from_edge(edge))
    }

    /// Returns the interpretation behind a handle.
    pub fn inter(&self, id: InterId) -> Option<&Inter> {
        self.graph.node_weight(id.node())
    }

    pub(crate) fn inter_mut(&mut self, id: InterId) -> Option<&mut Inter> {
        self.graph.node_weight_mut(id.node())
    }

    /// Number of interpretations, alive or removed.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph holds no interpretation.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of relations.
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all interpretations in insertion order.
    pub fn inters(&self) -> impl Iterator<Item = (InterId, &Inter)> {
        self.graph
            .node_indices()
            .map(InterId::from_node)
            .filter_map(|id| self.inter(id).map(|inter| (id, inter)))
    }

    /// Iterates over alive interpretations in insertion order.
    pub fn alive(&self) -> impl Iterator<Item = (InterId, &Inter)> {
        self.inters().filter(|(_, inter)| inter.is_alive())
    }

    /// Iterates over removed interpretations in insertion order.
    pub fn removed(&self) -> impl Iterator<Item = (InterId, &Inter)> {
        self.inters().filter(|(_, inter)| !inter.is_alive())
    }

    /// Lists all relations in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().map(|edge| Edge {
            id: RelationId::from_edge(edge.id()),
            source: InterId::from_node(edge.source()),
            target: InterId::from_node(edge.target()),
            relation: *edge.weight(),
        })
    }

    /// Returns true if a relation of this kind already links the two
    /// interpretations, in either direction.
    pub fn has_relation(&self, a: InterId, b: InterId, kind: RelationKind) -> bool {
        self.graph
            .edges_connecting(a.node(), b.node())
            .chain(self.graph.edges_connecting(b.node(), a.node()))
            .any(|edge| edge.weight().kind() == kind)
    }

    /// Interpretations linked to `id` by an exclusion, in either direction.
    ///
    /// The result is sorted and free of duplicates.
    pub fn exclusion_partners(&self, id: InterId) -> Vec<InterId> {
        let mut partners: Vec<InterId> = self
            .graph
            .edges_directed(id.node(), Direction::Outgoing)
            .filter(|edge| edge.weight().kind() == RelationKind::Exclusion)
            .map(|edge| InterId::from_node(edge.target()))
            .chain(
                self.graph
                    .edges_directed(id.node(), Direction::Incoming)
                    .filter(|edge| edge.weight().kind() == RelationKind::Exclusion)
                    .map(|edge| InterId::from_node(edge.source())),
            )
            .filter(|partner| *partner != id)
            .collect();
        partners.sort_unstable();
        partners.dedup();
        partners
    }

    /// Total strength of the support `id` receives from alive interpretations.
    pub fn incoming_support(&self, id: InterId) -> f64 {
        self.graph
            .edges_directed(id.node(), Direction::Incoming)
            .filter(|edge| edge.weight().kind() == RelationKind::Support)
            .filter(|edge| self.graph[edge.source()].is_alive())
            .map(|edge| edge.weight().strength())
            .sum()
    }

    /// Returns true if no exclusion links two alive interpretations, except
    /// between manual ones.
    pub fn is_consistent(&self) -> bool {
        self.graph.edge_references().all(|edge| {
            if edge.weight().kind() != RelationKind::Exclusion {
                return true;
            }
            let (a, b) = (&self.graph[edge.source()], &self.graph[edge.target()]);
            !(a.is_alive() && b.is_alive()) || (a.is_manual() && b.is_manual())
        })
    }

    /// Resolves exclusions until a fixed point is reached.
    ///
    /// See [`ReductionReport`] for the outcome. Calling this again on a
    /// reduced graph removes nothing.
    pub fn reduce(&mut self, config: &ReductionConfig) -> ReductionReport {
        reduction::reduce(self, config)
    }
}

#[cfg(test)]
mod tests {
    use omrsig_core::{geometry::Bounds, grade::Grade, shape::Shape};

    use super::*;
    use crate::sig::InterOrigin;

    fn inter(grade: f64) -> Inter {
        Inter::new(
            Shape::Dot,
            Grade::new(grade).unwrap(),
            Bounds::new(0.0, 0.0, 4.0, 4.0),
            RegionId::new(1),
            InterOrigin::Connector,
        )
    }

    #[test]
    fn test_handles_follow_insertion_order() {
        let mut graph = InterGraph::new(RegionId::new(1));
        let a = graph.add_inter(inter(0.5));
        let b = graph.add_inter(inter(0.6));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(graph.len(), 2);
        assert_eq!(a.to_string(), "inter-0");
    }

    #[test]
    fn test_add_relation_rejects_foreign_handles() {
        let mut graph = InterGraph::new(RegionId::new(1));
        let a = graph.add_inter(inter(0.5));

        let mut other = InterGraph::new(RegionId::new(2));
        other.add_inter(inter(0.5));
        let foreign = other.add_inter(inter(0.5));

        let result = graph.add_relation(a, foreign, RelationKind::Support, 1.0);
        assert!(matches!(result, Err(SigError::UnknownInter { id: 1 })));
        assert_eq!(graph.relation_count(), 0);
    }

    #[test]
    fn test_exclusion_is_symmetric() {
        let mut graph = InterGraph::new(RegionId::new(1));
        let a = graph.add_inter(inter(0.5));
        let b = graph.add_inter(inter(0.6));
        let c = graph.add_inter(inter(0.7));
        graph.add_relation(a, b, RelationKind::Exclusion, 1.0).unwrap();
        graph.add_relation(b, a, RelationKind::Exclusion, 1.0).unwrap();
        graph.add_relation(c, a, RelationKind::Support, 1.0).unwrap();

        assert_eq!(graph.exclusion_partners(a), vec![b]);
        assert_eq!(graph.exclusion_partners(b), vec![a]);
        assert!(graph.exclusion_partners(c).is_empty());
        assert!(graph.has_relation(b, a, RelationKind::Exclusion));
        assert!(!graph.has_relation(a, c, RelationKind::Exclusion));
        assert!(graph.has_relation(a, c, RelationKind::Support));
    }

    #[test]
    fn test_incoming_support_ignores_removed_sources() {
        let mut graph = InterGraph::new(RegionId::new(1));
        let a = graph.add_inter(inter(0.5));
        let b = graph.add_inter(inter(0.6));
        let c = graph.add_inter(inter(0.7));
        graph.add_relation(b, a, RelationKind::Support, 0.4).unwrap();
        graph.add_relation(c, a, RelationKind::Support, 0.3).unwrap();
        graph.add_relation(a, b, RelationKind::Support, 0.9).unwrap();
        assert!((graph.incoming_support(a) - 0.7).abs() < 1e-12);

        if let Some(c) = graph.inter_mut(c) {
            c.remove();
        }
        assert!((graph.incoming_support(a) - 0.4).abs() < 1e-12);
        assert_eq!(graph.removed().count(), 1);
        assert_eq!(graph.alive().count(), 2);
    }

    #[test]
    fn test_edges_in_insertion_order() {
        let mut graph = InterGraph::new(RegionId::new(1));
        let a = graph.add_inter(inter(0.5));
        let b = graph.add_inter(inter(0.6));
        graph.add_relation(b, a, RelationKind::Connection, 0.2).unwrap();
        graph.add_relation(a, b, RelationKind::Exclusion, 1.0).unwrap();

        let kinds: Vec<_> = graph.edges().map(|edge| edge.relation.kind()).collect();
        assert_eq!(kinds, vec![RelationKind::Connection, RelationKind::Exclusion]);
        let first = graph.edges().next().unwrap();
        assert_eq!((first.source, first.target), (b, a));
    }
}
