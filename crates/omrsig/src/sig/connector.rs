//! Bracket connectors between vertically adjacent staves.
//!
//! A bracket spanning several staves is segmented as one bracket per staff.
//! The short vertical piece bridging the gap between two consecutive staves
//! is the connector: it is inferred from the pair of brackets it joins,
//! graded on how well they line up, and promoted to an interpretation of its
//! own that supports both brackets.

use log::{debug, trace};

use omrsig_core::{
    geometry::Bounds,
    grade::GradeImpacts,
    identifier::StaffId,
    scale::Scale,
    shape::Shape,
};

use crate::{config::ConnectorConfig, error::SigError, region::Staff};

use super::{
    graph::InterGraph,
    inter::{Inter, InterId, InterOrigin},
    relation::RelationKind,
};

/// A candidate connection between an upper and a lower bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketConnection {
    upper: InterId,
    lower: InterId,
    bounds: Bounds,
    impacts: GradeImpacts,
}

impl BracketConnection {
    /// Returns the bracket on the upper staff.
    pub fn upper(&self) -> InterId {
        self.upper
    }

    /// Returns the bracket on the lower staff.
    pub fn lower(&self) -> InterId {
        self.lower
    }

    /// Returns the area bridged by the connector.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the grading details.
    pub fn impacts(&self) -> &GradeImpacts {
        &self.impacts
    }
}

/// Finds and grades bracket connectors in a region graph.
#[derive(Debug, Clone, Copy)]
pub struct ConnectorFinder {
    config: ConnectorConfig,
    scale: Scale,
}

impl ConnectorFinder {
    /// Creates a finder.
    pub fn new(config: ConnectorConfig, scale: Scale) -> Self {
        Self { config, scale }
    }

    /// Lists the candidate connections between alive brackets of adjacent
    /// staves, upper staves first, then by bracket handle.
    pub fn connections(&self, graph: &InterGraph, staves: &[Staff]) -> Vec<BracketConnection> {
        let interline = f64::from(self.scale.interline());
        let max_dx = self.config.max_dx() * interline;
        let max_gap = self.config.max_gap() * interline;

        let mut connections = Vec::new();
        for pair in staves.windows(2) {
            let upper_brackets = brackets_on(graph, pair[0].id());
            let lower_brackets = brackets_on(graph, pair[1].id());

            for &(upper, upper_bounds) in &upper_brackets {
                for &(lower, lower_bounds) in &lower_brackets {
                    let dx = upper_bounds.center().x() - lower_bounds.center().x();
                    let dx = f64::from(dx.abs());
                    let gap = f64::from(lower_bounds.min_y() - upper_bounds.max_y());
                    if dx > max_dx || gap < 0.0 || gap > max_gap {
                        trace!(
                            upper:% = upper,
                            lower:% = lower,
                            dx,
                            gap;
                            "Brackets not connectable"
                        );
                        continue;
                    }

                    let (narrow, wide) = {
                        let (a, b) = (upper_bounds.width(), lower_bounds.width());
                        (a.min(b), a.max(b))
                    };
                    let width_ratio = if wide > 0.0 {
                        f64::from(narrow / wide)
                    } else {
                        0.0
                    };
                    let impacts = GradeImpacts::new()
                        .with("alignment", 1.0 - dx / max_dx, 1.0)
                        .with("width", width_ratio, 1.0);

                    let center_x = (upper_bounds.center().x() + lower_bounds.center().x()) / 2.0;
                    let half_width = (upper_bounds.width() + lower_bounds.width()) / 4.0;
                    let bounds = Bounds::new(
                        center_x - half_width,
                        upper_bounds.max_y(),
                        center_x + half_width,
                        lower_bounds.min_y(),
                    );

                    connections.push(BracketConnection {
                        upper,
                        lower,
                        bounds,
                        impacts,
                    });
                }
            }
        }
        connections
    }

    /// Links connectable brackets and promotes good connectors.
    ///
    /// Every candidate connection links its two brackets with a
    /// [`RelationKind::Connection`]. Connectors graded at least the
    /// configured minimum become [`Shape::BracketConnector`] interpretations
    /// supporting both brackets. Returns the number of promoted connectors.
    ///
    /// # Errors
    ///
    /// Propagates graph errors; none are expected for handles taken from the
    /// graph itself.
    pub fn find(&self, graph: &mut InterGraph, staves: &[Staff]) -> Result<usize, SigError> {
        let mut promoted = 0;

        for connection in self.connections(graph, staves) {
            let grade = connection.impacts.grade();
            let strength = grade.map_or(0.0, |grade| grade.value());
            graph.add_relation(
                connection.upper,
                connection.lower,
                RelationKind::Connection,
                strength,
            )?;

            let Some(grade) = grade.filter(|grade| grade.value() >= self.config.min_grade())
            else {
                trace!(
                    upper:% = connection.upper,
                    lower:% = connection.lower,
                    strength;
                    "Connector grade too low"
                );
                continue;
            };

            let inter = Inter::new(
                Shape::BracketConnector,
                grade,
                connection.bounds,
                graph.region(),
                InterOrigin::Connector,
            )
            .with_impacts(connection.impacts.clone());
            let connector = graph.add_inter(inter);
            for bracket in [connection.upper, connection.lower] {
                graph.add_relation(connector, bracket, RelationKind::Support, grade.value())?;
            }

            debug!(
                connector:% = connector,
                upper:% = connection.upper,
                lower:% = connection.lower,
                grade = grade.value();
                "Bracket connector promoted"
            );
            promoted += 1;
        }

        Ok(promoted)
    }
}

fn brackets_on(graph: &InterGraph, staff: StaffId) -> Vec<(InterId, Bounds)> {
    graph
        .alive()
        .filter(|(_, inter)| inter.shape() == Shape::Bracket && inter.staff() == Some(staff))
        .map(|(id, inter)| (id, inter.bounds()))
        .collect()
}
