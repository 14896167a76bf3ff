//! Region and page processing.
//!
//! A region goes through the following stages, all sequential:
//!
//! 1. every classified primitive glyph becomes an interpretation, in pool
//!    order;
//! 2. every registered template runs its own matcher pass, and each accepted
//!    compound becomes an interpretation, in template then seed order;
//! 3. exclusions are derived between competing interpretations;
//! 4. bracket connectors are found across adjacent staves;
//! 5. the graph is reduced.
//!
//! Regions share no state, so a page processes them in parallel when the
//! `parallel` feature is enabled, and concatenates the results in region
//! order.

use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use omrsig_core::{identifier::RegionId, scale::Scale};

use crate::{
    config::AppConfig,
    error::SigError,
    evaluator::ShapeEvaluator,
    pattern::{MatchOutcome, PatternMatcher, PatternRegistry},
    region::{Region, Staff},
    sheet::Sheet,
    sig::{ConnectorFinder, Inter, InterGraph, InterId, ReductionReport, RelationDeriver},
};

/// The processing result of one region.
#[derive(Debug, Clone)]
pub struct RegionResult {
    region: RegionId,
    outcomes: Vec<MatchOutcome>,
    graph: InterGraph,
    report: ReductionReport,
}

impl RegionResult {
    /// Returns the region identifier.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Returns the matcher outcomes, in template order.
    pub fn outcomes(&self) -> &[MatchOutcome] {
        &self.outcomes
    }

    /// Returns the reduced interpretation graph.
    pub fn graph(&self) -> &InterGraph {
        &self.graph
    }

    /// Returns the reduction report.
    pub fn report(&self) -> &ReductionReport {
        &self.report
    }

    /// Iterates over the surviving interpretations.
    pub fn survivors(&self) -> impl Iterator<Item = (InterId, &Inter)> {
        self.report
            .survivors()
            .iter()
            .filter_map(|&id| self.graph.inter(id).map(|inter| (id, inter)))
    }
}

/// Processes one region at a time.
#[derive(Clone, Copy)]
pub struct RegionProcessor<'a> {
    registry: &'a PatternRegistry,
    evaluator: &'a dyn ShapeEvaluator,
    config: &'a AppConfig,
    scale: Scale,
}

impl<'a> RegionProcessor<'a> {
    /// Creates a region processor.
    pub fn new(
        registry: &'a PatternRegistry,
        evaluator: &'a dyn ShapeEvaluator,
        config: &'a AppConfig,
        scale: Scale,
    ) -> Self {
        Self {
            registry,
            evaluator,
            config,
            scale,
        }
    }

    /// Runs every stage over a region.
    ///
    /// # Errors
    ///
    /// Propagates precondition violations from the matcher, the compound
    /// builder and the graph.
    pub fn process(&self, region: &Region) -> Result<RegionResult, SigError> {
        info!(region = region.id().get(), glyphs = region.pool().len(); "Processing region");
        let mut graph = InterGraph::new(region.id());

        for glyph in region.pool().iter() {
            let staff = region.staff_of(glyph).map(Staff::id);
            if let Some(inter) = Inter::from_glyph(glyph, region.id(), staff) {
                graph.add_inter(inter);
            }
        }

        let mut outcomes = Vec::with_capacity(self.registry.len());
        for template in self.registry.iter() {
            let outcome = PatternMatcher::new(template, self.scale).run(region, self.evaluator)?;
            for compound in outcome.compounds() {
                let staff = region
                    .staff_at(compound.geometry().centroid())
                    .map(Staff::id);
                graph.add_inter(Inter::from_compound(
                    compound,
                    template.name(),
                    region.id(),
                    staff,
                ));
            }
            outcomes.push(outcome);
        }

        let exclusions = RelationDeriver::new(*self.config.relations()).derive(&mut graph)?;
        let connectors = ConnectorFinder::new(*self.config.connectors(), self.scale)
            .find(&mut graph, region.staves())?;
        debug!(
            region = region.id().get(),
            inters = graph.len(),
            exclusions,
            connectors;
            "Region graph built"
        );

        let report = graph.reduce(self.config.reduction());

        Ok(RegionResult {
            region: region.id(),
            outcomes,
            graph,
            report,
        })
    }
}

/// The processing result of a page.
#[derive(Debug, Clone)]
pub struct PageResult {
    regions: Vec<RegionResult>,
}

impl PageResult {
    /// Returns the region results, in region order.
    pub fn regions(&self) -> &[RegionResult] {
        &self.regions
    }

    /// Iterates over every surviving interpretation of the page.
    pub fn survivors(&self) -> impl Iterator<Item = (InterId, &Inter)> {
        self.regions.iter().flat_map(RegionResult::survivors)
    }
}

/// Processes every region of a page.
pub struct PageProcessor<'a> {
    registry: &'a PatternRegistry,
    evaluator: &'a dyn ShapeEvaluator,
    config: &'a AppConfig,
}

impl<'a> PageProcessor<'a> {
    /// Creates a page processor.
    pub fn new(
        registry: &'a PatternRegistry,
        evaluator: &'a dyn ShapeEvaluator,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            registry,
            evaluator,
            config,
        }
    }

    /// Processes all regions and concatenates their results.
    ///
    /// # Errors
    ///
    /// Returns the first region error, in region order.
    pub fn process(&self, sheet: &Sheet) -> Result<PageResult, SigError> {
        let processor =
            RegionProcessor::new(self.registry, self.evaluator, self.config, sheet.scale());

        #[cfg(feature = "parallel")]
        let regions = sheet
            .regions()
            .par_iter()
            .map(|region| processor.process(region))
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let regions = sheet
            .regions()
            .iter()
            .map(|region| processor.process(region))
            .collect::<Result<Vec<_>, _>>()?;

        let result = PageResult { regions };
        info!(
            regions = result.regions.len(),
            survivors = result.survivors().count();
            "Page processed"
        );
        Ok(result)
    }
}
