//! Integration tests for interpretation graph reduction.

use omrsig::{
    config::ReductionConfig,
    geometry::Bounds,
    grade::Grade,
    identifier::{GlyphId, RegionId},
    shape::Shape,
    sig::{Conflict, Inter, InterGraph, InterId, InterOrigin, RelationKind},
};

fn inter(glyph: u32, shape: Shape, grade: f64) -> Inter {
    Inter::new(
        shape,
        Grade::new(grade).unwrap(),
        Bounds::new(0.0, 0.0, 10.0, 10.0),
        RegionId::new(1),
        InterOrigin::Primitive {
            glyph: GlyphId::new(glyph),
        },
    )
}

fn exclude(graph: &mut InterGraph, a: InterId, b: InterId) {
    graph
        .add_relation(a, b, RelationKind::Exclusion, 1.0)
        .unwrap();
}

fn survivors(graph: &InterGraph) -> Vec<InterId> {
    graph.alive().map(|(id, _)| id).collect()
}

#[test]
fn test_mutual_support_converges() {
    let mut graph = InterGraph::new(RegionId::new(1));
    let a = graph.add_inter(inter(1, Shape::Sharp, 0.6));
    let b = graph.add_inter(inter(2, Shape::Natural, 0.6));
    let c = graph.add_inter(inter(3, Shape::Flat, 0.8));

    graph.add_relation(a, b, RelationKind::Support, 1.0).unwrap();
    graph.add_relation(b, a, RelationKind::Support, 1.0).unwrap();
    exclude(&mut graph, a, c);
    exclude(&mut graph, b, c);

    let report = graph.reduce(&ReductionConfig::new(64, 1.0));

    assert!(report.converged());
    assert_eq!(report.iterations(), 2);
    assert_eq!(report.survivors(), &[a, b]);
    assert_eq!(report.removed(), &[c]);
    assert!(graph.is_consistent());

    let boosted = graph.inter(a).unwrap().contextual_grade();
    assert!(boosted.value() > 0.8);
}

#[test]
fn test_exclusion_triangle_keeps_best() {
    let mut graph = InterGraph::new(RegionId::new(1));
    let a = graph.add_inter(inter(1, Shape::Sharp, 0.9));
    let b = graph.add_inter(inter(2, Shape::Flat, 0.8));
    let c = graph.add_inter(inter(3, Shape::Natural, 0.7));
    exclude(&mut graph, a, b);
    exclude(&mut graph, b, c);
    exclude(&mut graph, c, a);

    let report = graph.reduce(&ReductionConfig::default());

    assert_eq!(report.survivors(), &[a]);
    assert!(graph.is_consistent());
}

#[test]
fn test_exclusion_chain_frees_the_far_end() {
    let mut graph = InterGraph::new(RegionId::new(1));
    let a = graph.add_inter(inter(1, Shape::Sharp, 0.9));
    let b = graph.add_inter(inter(2, Shape::Flat, 0.8));
    let c = graph.add_inter(inter(3, Shape::Natural, 0.7));
    exclude(&mut graph, a, b);
    exclude(&mut graph, b, c);

    let report = graph.reduce(&ReductionConfig::default());

    assert_eq!(report.survivors(), &[a, c]);
    assert_eq!(report.removed(), &[b]);
}

#[test]
fn test_manual_beats_any_grade() {
    let mut graph = InterGraph::new(RegionId::new(1));
    let strong = graph.add_inter(inter(1, Shape::Sharp, 1.0));
    let manual = graph.add_inter(inter(2, Shape::Flat, 0.1).with_manual(true));
    exclude(&mut graph, strong, manual);

    let report = graph.reduce(&ReductionConfig::default());

    assert_eq!(report.survivors(), &[manual]);
    assert!(report.conflicts().is_empty());
}

#[test]
fn test_manual_pair_stays_and_is_reported() {
    let mut graph = InterGraph::new(RegionId::new(4));
    let a = graph.add_inter(inter(1, Shape::Sharp, 0.5).with_manual(true));
    let b = graph.add_inter(inter(2, Shape::Flat, 0.5).with_manual(true));
    exclude(&mut graph, b, a);

    let report = graph.reduce(&ReductionConfig::default());

    assert_eq!(report.survivors(), &[a, b]);
    assert_eq!(
        report.conflicts(),
        &[Conflict::ManualExclusion {
            region: RegionId::new(4),
            a,
            b
        }]
    );
    assert!(graph.is_consistent());
}

#[test]
fn test_reduction_is_idempotent() {
    let mut graph = InterGraph::new(RegionId::new(1));
    let ids: Vec<_> = (0..6)
        .map(|idx| graph.add_inter(inter(idx, Shape::Dot, 0.3 + 0.1 * f64::from(idx))))
        .collect();
    for pair in ids.windows(2) {
        exclude(&mut graph, pair[0], pair[1]);
    }

    let first = graph.reduce(&ReductionConfig::default());
    let before = survivors(&graph);
    let second = graph.reduce(&ReductionConfig::default());

    assert!(!first.removed().is_empty());
    assert!(second.removed().is_empty());
    assert_eq!(second.iterations(), 1);
    assert_eq!(survivors(&graph), before);
}

#[test]
fn test_exhausted_pass_bound_is_reported() {
    let mut graph = InterGraph::new(RegionId::new(2));
    let a = graph.add_inter(inter(1, Shape::Sharp, 0.9));
    let b = graph.add_inter(inter(2, Shape::Flat, 0.8));
    exclude(&mut graph, a, b);

    let report = graph.reduce(&ReductionConfig::new(1, 0.5));

    assert!(!report.converged());
    assert_eq!(
        report.conflicts(),
        &[Conflict::NonConvergence {
            region: RegionId::new(2),
            iterations: 1
        }]
    );
    assert_eq!(report.survivors(), &[a]);
}

#[test]
fn test_removed_supporter_stops_boosting() {
    // c loses against d, so it no longer supports a in the next pass
    let mut graph = InterGraph::new(RegionId::new(1));
    let a = graph.add_inter(inter(1, Shape::Sharp, 0.5));
    let b = graph.add_inter(inter(2, Shape::Flat, 0.55));
    let c = graph.add_inter(inter(3, Shape::Dot, 0.4));
    let d = graph.add_inter(inter(4, Shape::Dot, 0.95));
    graph.add_relation(c, a, RelationKind::Support, 1.0).unwrap();
    exclude(&mut graph, a, b);
    exclude(&mut graph, c, d);

    let report = graph.reduce(&ReductionConfig::new(64, 1.0));

    assert!(report.converged());
    // a won the first pass with c's support; nothing revives b afterwards
    assert_eq!(report.survivors(), &[a, d]);
    assert_eq!(graph.inter(a).unwrap().contextual_grade().value(), 0.5);
}
