//! The generic two-anchor matcher.

use log::{debug, trace};

use omrsig_core::scale::Scale;

use crate::{
    compound::{Compound, CompoundBuilder},
    error::SigError,
    evaluator::ShapeEvaluator,
    glyph::{Glyph, Reservation},
    region::{Region, Staff},
};

use super::PatternTemplate;

/// The result of one matcher pass over a region.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    template: String,
    pairs: usize,
    compounds: Vec<Compound>,
}

impl MatchOutcome {
    /// Returns the name of the template that produced this outcome.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the number of anchor pairs handed to the compound builder.
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// Returns the accepted compounds, in seed order.
    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// Consumes the outcome, returning its compounds.
    pub fn into_compounds(self) -> Vec<Compound> {
        self.compounds
    }

    /// Number of accepted compounds.
    pub fn success_count(&self) -> usize {
        self.compounds.len()
    }
}

/// Runs one [`PatternTemplate`] over the glyphs of a region.
///
/// Every glyph matching the first anchor is paired with every other glyph
/// matching the second anchor, within the horizontal tolerance (and on the
/// same staff when required). Each pair is handed to the compound builder,
/// seeded with the first-anchor glyph. All builds of a pass share one
/// [`Reservation`], so a glyph ends up in at most one compound.
///
/// Pairs are visited in ascending identifier order of the first glyph, then
/// of the second glyph, so a pass is fully deterministic.
pub struct PatternMatcher<'a> {
    template: &'a PatternTemplate,
    scale: Scale,
}

impl<'a> PatternMatcher<'a> {
    /// Creates a matcher for a template at a page scale.
    pub fn new(template: &'a PatternTemplate, scale: Scale) -> Self {
        Self { template, scale }
    }

    /// Returns the template this matcher runs.
    pub fn template(&self) -> &PatternTemplate {
        self.template
    }

    /// Runs a full pass over a region.
    ///
    /// # Errors
    ///
    /// Propagates precondition violations from the compound builder. A
    /// template that matches nothing is not an error.
    pub fn run(
        &self,
        region: &Region,
        evaluator: &dyn ShapeEvaluator,
    ) -> Result<MatchOutcome, SigError> {
        let pool = region.pool();
        let builder = CompoundBuilder::new(pool, evaluator, self.scale);
        let spec = self.template.compound_spec();
        let mut reservation = Reservation::for_pool(pool);
        let max_dx = self.scale.to_pixels_f32(self.template.dx_tolerance());

        let mut pairs = 0;
        let mut compounds = Vec::new();

        for top in pool.iter() {
            let Some(top_staff) = region.staff_of(top) else {
                trace!(glyph = top.id().get(); "Glyph outside any staff area");
                continue;
            };
            if !self.matches_first(top, top_staff) {
                continue;
            }

            for bot in pool.iter().filter(|bot| bot.id() != top.id()) {
                if !self.matches_second(region, top, top_staff, bot, max_dx) {
                    continue;
                }
                pairs += 1;
                trace!(top = top.id().get(), bot = bot.id().get(); "Anchor pair");

                if let Some(compound) = builder.build(top, &spec, &mut reservation)? {
                    compounds.push(compound);
                }
            }
        }

        debug!(
            template = self.template.name(),
            region = region.id().get(),
            pairs,
            successes = compounds.len();
            "Pattern pass done"
        );

        Ok(MatchOutcome {
            template: self.template.name().to_string(),
            pairs,
            compounds,
        })
    }

    fn matches_first(&self, glyph: &Glyph, staff: &Staff) -> bool {
        self.template
            .first()
            .matches(glyph, staff, self.template.pitch_tolerance())
    }

    fn matches_second(
        &self,
        region: &Region,
        top: &Glyph,
        top_staff: &Staff,
        bot: &Glyph,
        max_dx: f32,
    ) -> bool {
        let Some(bot_staff) = region.staff_of(bot) else {
            return false;
        };
        if self.template.same_staff() && bot_staff.id() != top_staff.id() {
            return false;
        }
        let dx = (bot.centroid().x() - top.centroid().x()).abs();
        dx <= max_dx
            && self
                .template
                .second()
                .matches(bot, bot_staff, self.template.pitch_tolerance())
    }
}

#[cfg(test)]
mod tests {
    use omrsig_core::{
        geometry::{Bounds, Point, Size},
        grade::Grade,
        identifier::{GlyphId, RegionId, StaffId},
        shape::Shape,
    };

    use super::*;
    use crate::{
        evaluator::Evaluation,
        glyph::{GlyphGeometry, GlyphPool},
    };

    fn dot(id: u32, x: f32, y: f32) -> Glyph {
        let center = Point::new(x, y);
        Glyph::new(
            GlyphId::new(id),
            GlyphGeometry::new(center.to_bounds(Size::new(6.0, 6.0)), center, 30),
        )
        .with_evaluation(Shape::Dot, Grade::new(0.9).unwrap())
    }

    fn region(glyphs: Vec<Glyph>) -> Region {
        Region::new(
            RegionId::new(1),
            Bounds::new(0.0, 0.0, 1000.0, 300.0),
            vec![Staff::new(StaffId::new(1), 100.0, 180.0, 0.0, 1000.0)],
            GlyphPool::new(glyphs).unwrap(),
        )
    }

    fn clef(_: &GlyphGeometry, _: Scale) -> Option<Evaluation> {
        Some(Evaluation::new(Shape::FClef, Grade::new(0.9).unwrap()))
    }

    #[test]
    fn test_bass_pair_yields_one_compound() {
        // Pitch -3 at y=110, pitch -1 at y=130
        let region = region(vec![dot(1, 200.0, 110.0), dot(2, 200.0, 130.0)]);
        let template = PatternTemplate::bass();
        let matcher = PatternMatcher::new(&template, Scale::new(20).unwrap());

        let outcome = matcher.run(&region, &clef).unwrap();
        assert_eq!(outcome.template(), "bass");
        assert_eq!(outcome.pairs(), 1);
        assert_eq!(outcome.success_count(), 1);
        assert_eq!(
            outcome.compounds()[0].members(),
            &[GlyphId::new(1), GlyphId::new(2)]
        );
    }

    #[test]
    fn test_wrong_pitch_is_not_paired() {
        let region = region(vec![dot(1, 200.0, 110.0), dot(2, 200.0, 150.0)]);
        let template = PatternTemplate::bass();
        let matcher = PatternMatcher::new(&template, Scale::new(20).unwrap());

        let outcome = matcher.run(&region, &clef).unwrap();
        assert_eq!(outcome.pairs(), 0);
        assert_eq!(outcome.success_count(), 0);
    }

    #[test]
    fn test_glyphs_outside_staff_areas_are_ignored() {
        let region = Region::new(
            RegionId::new(1),
            Bounds::new(0.0, 0.0, 1000.0, 300.0),
            Vec::new(),
            GlyphPool::new(vec![dot(1, 200.0, 110.0), dot(2, 200.0, 130.0)]).unwrap(),
        );
        let template = PatternTemplate::bass();
        let matcher = PatternMatcher::new(&template, Scale::new(20).unwrap());

        let outcome = matcher.run(&region, &clef).unwrap();
        assert_eq!(outcome.pairs(), 0);
    }

    #[test]
    fn test_second_pair_on_consumed_glyphs_fails() {
        // Two bottom dots for the same top dot: both pairs are attempted
        let region = region(vec![
            dot(1, 200.0, 110.0),
            dot(2, 200.0, 130.0),
            dot(3, 202.0, 131.0),
        ]);
        let template = PatternTemplate::bass();
        let matcher = PatternMatcher::new(&template, Scale::new(20).unwrap());

        let outcome = matcher.run(&region, &clef).unwrap();
        assert_eq!(outcome.pairs(), 2);
        assert_eq!(outcome.success_count(), 1);
    }
}
