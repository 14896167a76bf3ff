//! Derivation of exclusions between competing interpretations.

use log::debug;

use crate::{config::RelationConfig, error::SigError};

use super::{graph::InterGraph, inter::InterId, relation::RelationKind};

/// Adds exclusions between interpretations competing for the same ink.
///
/// Two alive interpretations exclude each other when they claim a common
/// glyph (strength 1), or when their bounds overlap by at least the
/// configured ratio (strength = overlap ratio). Pairs already linked by an
/// exclusion are left alone, so deriving twice adds nothing.
#[derive(Debug, Clone, Copy)]
pub struct RelationDeriver {
    config: RelationConfig,
}

impl RelationDeriver {
    /// Creates a deriver.
    pub fn new(config: RelationConfig) -> Self {
        Self { config }
    }

    /// Derives exclusions over the alive interpretations of a graph.
    ///
    /// Returns the number of relations added.
    ///
    /// # Errors
    ///
    /// Propagates graph errors; none are expected for handles taken from the
    /// graph itself.
    pub fn derive(&self, graph: &mut InterGraph) -> Result<usize, SigError> {
        let alive: Vec<InterId> = graph.alive().map(|(id, _)| id).collect();
        let mut pending = Vec::new();

        for (i, &a) in alive.iter().enumerate() {
            for &b in &alive[i + 1..] {
                let (Some(first), Some(second)) = (graph.inter(a), graph.inter(b)) else {
                    continue;
                };
                if graph.has_relation(a, b, RelationKind::Exclusion) {
                    continue;
                }
                if first.shares_member(second) {
                    pending.push((a, b, 1.0));
                    continue;
                }
                if first.members().is_empty() || second.members().is_empty() {
                    continue;
                }
                let ratio = f64::from(first.bounds().overlap_ratio(&second.bounds()));
                if ratio >= self.config.min_overlap() {
                    pending.push((a, b, ratio));
                }
            }
        }

        for &(a, b, strength) in &pending {
            graph.add_relation(a, b, RelationKind::Exclusion, strength)?;
        }
        debug!(region = graph.region().get(), exclusions = pending.len(); "Exclusions derived");
        Ok(pending.len())
    }
}
