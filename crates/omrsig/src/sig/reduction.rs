//! Greedy exclusion resolution over an interpretation graph.
//!
//! Each pass refreshes the contextual grade of every alive interpretation,
//! then visits them by decreasing contextual grade (ascending handle on
//! ties). A visited interpretation removes each alive exclusion partner it
//! grades at least as well as, except that manual interpretations always
//! win against automatic ones. Passes repeat until one removes nothing.

use log::{debug, info, warn};
use serde::Serialize;

use omrsig_core::{grade::Grade, identifier::RegionId};

use crate::config::ReductionConfig;

use super::{
    graph::InterGraph,
    inter::{Inter, InterId},
};

/// A situation the reduction could not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// Two manual interpretations exclude each other; both are kept.
    ManualExclusion {
        region: RegionId,
        a: InterId,
        b: InterId,
    },

    /// The pass bound was reached while passes still removed something.
    NonConvergence { region: RegionId, iterations: usize },
}

/// The outcome of [`InterGraph::reduce`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReductionReport {
    survivors: Vec<InterId>,
    removed: Vec<InterId>,
    conflicts: Vec<Conflict>,
    iterations: usize,
}

impl ReductionReport {
    /// Alive interpretations after reduction, in handle order.
    pub fn survivors(&self) -> &[InterId] {
        &self.survivors
    }

    /// Interpretations removed by this reduction, in removal order.
    pub fn removed(&self) -> &[InterId] {
        &self.removed
    }

    /// Unresolved situations met during reduction.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Number of passes run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns true if reduction reached a fixed point.
    pub fn converged(&self) -> bool {
        !self
            .conflicts
            .iter()
            .any(|conflict| matches!(conflict, Conflict::NonConvergence { .. }))
    }
}

pub(super) fn reduce(graph: &mut InterGraph, config: &ReductionConfig) -> ReductionReport {
    let region = graph.region();
    let mut report = ReductionReport::default();
    let mut converged = false;

    while report.iterations < config.max_iterations() {
        report.iterations += 1;
        let removed = run_pass(graph, config, &mut report);
        debug!(region = region.get(), pass = report.iterations, removed; "Reduction pass");
        if removed == 0 {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            region = region.get(),
            iterations = report.iterations;
            "Reduction did not converge"
        );
        report.conflicts.push(Conflict::NonConvergence {
            region,
            iterations: report.iterations,
        });
    }

    report.survivors = graph.alive().map(|(id, _)| id).collect();
    info!(
        region = region.get(),
        survivors = report.survivors.len(),
        removed = report.removed.len(),
        iterations = report.iterations;
        "Reduction done"
    );
    report
}

fn run_pass(
    graph: &mut InterGraph,
    config: &ReductionConfig,
    report: &mut ReductionReport,
) -> usize {
    let mut ranked: Vec<(InterId, Grade, bool)> = graph
        .alive()
        .map(|(id, inter)| {
            let support = graph.incoming_support(id);
            let contextual = inter.grade().contextual(support, config.support_gain());
            (id, contextual, inter.is_manual())
        })
        .collect();

    for &(id, contextual, _) in &ranked {
        if let Some(inter) = graph.inter_mut(id) {
            inter.set_contextual(contextual);
        }
    }

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut removed = 0;
    for &(n, n_grade, n_manual) in &ranked {
        if !is_alive(graph, n) {
            continue;
        }
        for m in graph.exclusion_partners(n) {
            if !is_alive(graph, m) {
                continue;
            }
            // Alive partners had their contextual grade refreshed above
            let Some(m_grade) = graph.inter(m).map(Inter::contextual_grade) else {
                continue;
            };
            let m_manual = graph.inter(m).is_some_and(|inter| inter.is_manual());

            if m_manual {
                if n_manual {
                    record_manual_conflict(graph.region(), n, m, report);
                    continue;
                }
                remove(graph, n, m, report);
                removed += 1;
                break;
            }
            if n_grade.total_cmp(&m_grade).is_ge() {
                remove(graph, m, n, report);
                removed += 1;
            }
        }
    }
    removed
}

fn is_alive(graph: &InterGraph, id: InterId) -> bool {
    graph.inter(id).is_some_and(|inter| inter.is_alive())
}

fn remove(graph: &mut InterGraph, loser: InterId, winner: InterId, report: &mut ReductionReport) {
    if let Some(inter) = graph.inter_mut(loser) {
        inter.remove();
        debug!(
            region = graph.region().get(),
            removed:% = loser,
            by:% = winner;
            "Inter removed"
        );
        report.removed.push(loser);
    }
}

fn record_manual_conflict(
    region: RegionId,
    n: InterId,
    m: InterId,
    report: &mut ReductionReport,
) {
    let (a, b) = if n < m { (n, m) } else { (m, n) };
    let conflict = Conflict::ManualExclusion { region, a, b };
    if !report.conflicts.contains(&conflict) {
        warn!(region = region.get(), a:% = a, b:% = b; "Manual inters exclude each other");
        report.conflicts.push(conflict);
    }
}
