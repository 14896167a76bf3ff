//! Compound building: merging a seed glyph with its neighbors.
//!
//! A [`CompoundBuilder`] works on one glyph pool. Given a seed glyph and a
//! [`CompoundSpec`], it collects the available glyphs intersecting the search
//! region around the seed, unites them into a candidate glyph, has the
//! candidate evaluated and accepts it when the evaluated shape belongs to the
//! target family with a small enough doubt.
//!
//! Accepted members are reserved in the pass [`Reservation`], so no later
//! build of the same pass can claim them again.

use log::{debug, trace};

use omrsig_core::{
    grade::{Doubt, Grade, GradeImpacts},
    identifier::GlyphId,
    scale::Scale,
    shape::{Shape, ShapeSet},
};

use crate::{
    error::SigError,
    evaluator::ShapeEvaluator,
    glyph::{Glyph, GlyphGeometry, GlyphPool, Reservation},
    pattern::SearchRegion,
};

/// What a compound must look like to be accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundSpec {
    search: SearchRegion,
    targets: ShapeSet,
    max_doubt: Doubt,
}

impl CompoundSpec {
    /// Creates the build parameters for one template.
    pub fn new(search: SearchRegion, targets: ShapeSet, max_doubt: Doubt) -> Self {
        Self {
            search,
            targets,
            max_doubt,
        }
    }

    /// Returns the search region.
    pub fn search(&self) -> SearchRegion {
        self.search
    }

    /// Returns the target shapes.
    pub fn targets(&self) -> ShapeSet {
        self.targets
    }

    /// Returns the maximum acceptable doubt.
    pub fn max_doubt(&self) -> Doubt {
        self.max_doubt
    }

    /// A glyph may join a compound unless a human fixed it to a shape outside
    /// the target family.
    fn is_suitable(&self, glyph: &Glyph) -> bool {
        !glyph.is_manual() || glyph.has_shape_in(self.targets)
    }
}

/// An accepted compound glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    geometry: GlyphGeometry,
    shape: Shape,
    grade: Grade,
    impacts: Option<GradeImpacts>,
    members: Vec<GlyphId>,
}

impl Compound {
    /// Returns the united geometry.
    pub fn geometry(&self) -> &GlyphGeometry {
        &self.geometry
    }

    /// Returns the evaluated shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the evaluated grade.
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Returns the evaluation impacts, if any.
    pub fn impacts(&self) -> Option<&GradeImpacts> {
        self.impacts.as_ref()
    }

    /// Returns the member glyph identifiers, in ascending order.
    pub fn members(&self) -> &[GlyphId] {
        &self.members
    }

    /// Returns true if the glyph is a member of this compound.
    pub fn contains(&self, id: GlyphId) -> bool {
        self.members.binary_search(&id).is_ok()
    }
}

/// Builds compounds out of the glyphs of one pool.
pub struct CompoundBuilder<'a> {
    pool: &'a GlyphPool,
    evaluator: &'a dyn ShapeEvaluator,
    scale: Scale,
}

impl<'a> CompoundBuilder<'a> {
    /// Creates a builder over a glyph pool.
    pub fn new(pool: &'a GlyphPool, evaluator: &'a dyn ShapeEvaluator, scale: Scale) -> Self {
        Self {
            pool,
            evaluator,
            scale,
        }
    }

    /// Tries to build one compound around a seed glyph.
    ///
    /// Returns `Ok(None)` when the candidate is rejected: the seed is already
    /// reserved or not suitable, nothing was recognized, the shape is outside
    /// the targets or the doubt is too high. On acceptance every member is
    /// reserved in `reservation`.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::UnknownGlyph`] if the seed does not belong to the
    /// builder's pool. The reservation is left untouched.
    pub fn build(
        &self,
        seed: &Glyph,
        spec: &CompoundSpec,
        reservation: &mut Reservation,
    ) -> Result<Option<Compound>, SigError> {
        let seed_position = self
            .pool
            .position(seed.id())
            .ok_or(SigError::UnknownGlyph { id: seed.id() })?;

        if reservation.is_reserved(seed_position) {
            trace!(seed = seed.id().get(); "Seed already consumed");
            return Ok(None);
        }
        if !spec.is_suitable(seed) {
            trace!(seed = seed.id().get(); "Seed manually fixed outside targets");
            return Ok(None);
        }

        let area = spec.search.around(seed.centroid(), self.scale);
        let positions: Vec<usize> = self
            .pool
            .indexed()
            .filter(|&(position, glyph)| {
                position == seed_position
                    || (!reservation.is_reserved(position)
                        && glyph.bounds().intersects(&area)
                        && spec.is_suitable(glyph))
            })
            .map(|(position, _)| position)
            .collect();

        let parts: Vec<&Glyph> = positions
            .iter()
            .filter_map(|&position| self.pool.at(position))
            .collect();
        let Some(geometry) = GlyphGeometry::union(parts.iter().map(|glyph| glyph.geometry()))
        else {
            return Ok(None);
        };

        let Some(evaluation) = self.evaluator.evaluate(&geometry, self.scale) else {
            trace!(seed = seed.id().get(), parts = parts.len(); "Compound not recognized");
            return Ok(None);
        };

        let (shape, grade, impacts) = evaluation.into_parts();
        if !spec.targets.contains(shape) {
            trace!(seed = seed.id().get(), shape:% = shape; "Compound shape outside targets");
            return Ok(None);
        }
        if !grade.is_acceptable(spec.max_doubt) {
            trace!(
                seed = seed.id().get(),
                shape:% = shape,
                grade = grade.value();
                "Compound doubt too high"
            );
            return Ok(None);
        }

        reservation.reserve_all(&positions);
        let members: Vec<GlyphId> = parts.iter().map(|glyph| glyph.id()).collect();

        debug!(
            seed = seed.id().get(),
            shape:% = shape,
            grade = grade.value(),
            members:? = members;
            "Compound accepted"
        );

        Ok(Some(Compound {
            geometry,
            shape,
            grade,
            impacts,
            members,
        }))
    }
}

#[cfg(test)]
mod tests {
    use omrsig_core::{
        geometry::{Point, Size},
        scale::InterlineFraction,
    };

    use super::*;
    use crate::evaluator::Evaluation;

    fn scale() -> Scale {
        Scale::new(20).unwrap()
    }

    fn dot(id: u32, x: f32, y: f32) -> Glyph {
        let center = Point::new(x, y);
        Glyph::new(
            GlyphId::new(id),
            GlyphGeometry::new(center.to_bounds(Size::new(6.0, 6.0)), center, 30),
        )
        .with_evaluation(Shape::Dot, Grade::new(0.9).unwrap())
    }

    fn spec(max_doubt: f64) -> CompoundSpec {
        let f = |v| InterlineFraction::new(v).unwrap();
        CompoundSpec::new(
            SearchRegion::new(f(2.0), f(0.5), f(0.0), f(3.0)),
            ShapeSet::bass_clefs(),
            Doubt::new(max_doubt).unwrap(),
        )
    }

    fn clef_evaluator(grade: f64) -> impl Fn(&GlyphGeometry, Scale) -> Option<Evaluation> {
        move |_: &GlyphGeometry, _: Scale| {
            Some(Evaluation::new(Shape::FClef, Grade::new(grade).unwrap()))
        }
    }

    #[test]
    fn test_build_merges_intersecting_glyphs() {
        // Top dot at (100, 110), bottom dot right below, a far glyph outside
        let pool = GlyphPool::new(vec![
            dot(1, 100.0, 110.0),
            dot(2, 100.0, 130.0),
            dot(3, 300.0, 130.0),
        ])
        .unwrap();
        let evaluator = clef_evaluator(0.9);
        let builder = CompoundBuilder::new(&pool, &evaluator, scale());
        let mut reservation = Reservation::for_pool(&pool);

        let seed = pool.get(GlyphId::new(1)).unwrap();
        let compound = builder
            .build(seed, &spec(0.3), &mut reservation)
            .unwrap()
            .expect("compound should be accepted");

        assert_eq!(compound.shape(), Shape::FClef);
        assert_eq!(compound.members(), &[GlyphId::new(1), GlyphId::new(2)]);
        assert!(compound.contains(GlyphId::new(2)));
        assert!(!compound.contains(GlyphId::new(3)));
        assert_eq!(reservation.reserved_count(), 2);
    }

    #[test]
    fn test_build_rejects_high_doubt() {
        let pool = GlyphPool::new(vec![dot(1, 100.0, 110.0), dot(2, 100.0, 130.0)]).unwrap();
        let evaluator = clef_evaluator(0.6);
        let builder = CompoundBuilder::new(&pool, &evaluator, scale());
        let mut reservation = Reservation::for_pool(&pool);

        let seed = pool.get(GlyphId::new(1)).unwrap();
        let result = builder.build(seed, &spec(0.3), &mut reservation).unwrap();
        assert!(result.is_none());
        assert_eq!(reservation.reserved_count(), 0);
    }

    #[test]
    fn test_build_rejects_shape_outside_targets() {
        let pool = GlyphPool::new(vec![dot(1, 100.0, 110.0)]).unwrap();
        let evaluator = |_: &GlyphGeometry, _: Scale| {
            Some(Evaluation::new(Shape::GClef, Grade::new(0.99).unwrap()))
        };
        let builder = CompoundBuilder::new(&pool, &evaluator, scale());
        let mut reservation = Reservation::for_pool(&pool);

        let seed = pool.get(GlyphId::new(1)).unwrap();
        assert!(builder.build(seed, &spec(0.3), &mut reservation).unwrap().is_none());
    }

    #[test]
    fn test_build_rejects_unrecognized() {
        let pool = GlyphPool::new(vec![dot(1, 100.0, 110.0)]).unwrap();
        let evaluator = |_: &GlyphGeometry, _: Scale| None;
        let builder = CompoundBuilder::new(&pool, &evaluator, scale());
        let mut reservation = Reservation::for_pool(&pool);

        let seed = pool.get(GlyphId::new(1)).unwrap();
        assert!(builder.build(seed, &spec(0.3), &mut reservation).unwrap().is_none());
    }

    #[test]
    fn test_reserved_glyphs_are_skipped() {
        let pool = GlyphPool::new(vec![
            dot(1, 100.0, 110.0),
            dot(2, 100.0, 130.0),
            dot(3, 101.0, 112.0),
        ])
        .unwrap();
        let evaluator = clef_evaluator(0.9);
        let builder = CompoundBuilder::new(&pool, &evaluator, scale());
        let mut reservation = Reservation::for_pool(&pool);

        let first = builder
            .build(pool.get(GlyphId::new(1)).unwrap(), &spec(0.3), &mut reservation)
            .unwrap()
            .unwrap();
        assert_eq!(first.members().len(), 3);

        // Seed 3 was consumed by the first compound
        let second = builder
            .build(pool.get(GlyphId::new(3)).unwrap(), &spec(0.3), &mut reservation)
            .unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn test_manual_glyph_outside_targets_is_never_merged() {
        let sharp = {
            let center = Point::new(95.0, 120.0);
            Glyph::new(
                GlyphId::new(5),
                GlyphGeometry::new(center.to_bounds(Size::new(10.0, 30.0)), center, 100),
            )
            .with_manual_shape(Shape::Sharp)
        };
        let pool = GlyphPool::new(vec![dot(1, 100.0, 110.0), dot(2, 100.0, 130.0), sharp])
            .unwrap();
        let evaluator = clef_evaluator(0.9);
        let builder = CompoundBuilder::new(&pool, &evaluator, scale());
        let mut reservation = Reservation::for_pool(&pool);

        let compound = builder
            .build(pool.get(GlyphId::new(1)).unwrap(), &spec(0.3), &mut reservation)
            .unwrap()
            .unwrap();
        assert!(!compound.contains(GlyphId::new(5)));

        // A manual seed outside the family is not overridden either
        let mut fresh = Reservation::for_pool(&pool);
        let from_manual = builder
            .build(pool.get(GlyphId::new(5)).unwrap(), &spec(0.3), &mut fresh)
            .unwrap();
        assert!(from_manual.is_none());
    }

    #[test]
    fn test_foreign_seed_is_a_precondition_violation() {
        let pool = GlyphPool::new(vec![dot(1, 100.0, 110.0)]).unwrap();
        let evaluator = clef_evaluator(0.9);
        let builder = CompoundBuilder::new(&pool, &evaluator, scale());
        let mut reservation = Reservation::for_pool(&pool);

        let stranger = dot(99, 100.0, 110.0);
        let result = builder.build(&stranger, &spec(0.3), &mut reservation);
        assert!(matches!(result, Err(SigError::UnknownGlyph { id }) if id == GlyphId::new(99)));
        assert_eq!(reservation.reserved_count(), 0);
    }
}
