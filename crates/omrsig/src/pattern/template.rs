//! Declarative pattern templates.

use serde::Deserialize;

use omrsig_core::{
    geometry::{Bounds, Point},
    grade::Doubt,
    scale::{InterlineFraction, Scale},
    shape::{Shape, ShapeSet},
};

use crate::{compound::CompoundSpec, error::SigError, glyph::Glyph, region::Staff};

/// One anchor of a template: an acceptable shape set at a pitch position.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Anchor {
    shapes: ShapeSet,
    pitch: f32,
}

impl Anchor {
    /// Creates an anchor.
    pub fn new(shapes: ShapeSet, pitch: f32) -> Self {
        Self { shapes, pitch }
    }

    /// Returns the acceptable shapes.
    pub fn shapes(&self) -> ShapeSet {
        self.shapes
    }

    /// Returns the expected pitch position.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Checks shape and pitch position of a glyph relative to its staff.
    pub fn matches(&self, glyph: &Glyph, staff: &Staff, pitch_tolerance: f32) -> bool {
        glyph.has_shape_in(self.shapes)
            && (staff.pitch_position(glyph.centroid().y()) - self.pitch).abs() <= pitch_tolerance
    }
}

/// The area searched for merge candidates, relative to a seed centroid.
///
/// Each extent is an interline fraction measured from the centroid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchRegion {
    left: InterlineFraction,
    right: InterlineFraction,
    up: InterlineFraction,
    down: InterlineFraction,
}

impl SearchRegion {
    /// Creates a search region from its four extents.
    pub fn new(
        left: InterlineFraction,
        right: InterlineFraction,
        up: InterlineFraction,
        down: InterlineFraction,
    ) -> Self {
        Self {
            left,
            right,
            up,
            down,
        }
    }

    /// Builds the pixel search box around a seed centroid.
    ///
    /// # Examples
    ///
    /// ```
    /// use omrsig::pattern::SearchRegion;
    /// use omrsig_core::{geometry::Point, scale::{InterlineFraction, Scale}};
    ///
    /// let f = |v| InterlineFraction::new(v).unwrap();
    /// let region = SearchRegion::new(f(2.0), f(0.0), f(0.0), f(3.0));
    /// let area = region.around(Point::new(100.0, 50.0), Scale::new(10).unwrap());
    ///
    /// assert_eq!(area.min_x(), 80.0);
    /// assert_eq!(area.max_x(), 100.0);
    /// assert_eq!(area.min_y(), 50.0);
    /// assert_eq!(area.max_y(), 80.0);
    /// ```
    pub fn around(&self, center: Point, scale: Scale) -> Bounds {
        let px = |fraction| scale.to_pixels(fraction) as f32;
        Bounds::new(
            center.x() - px(self.left),
            center.y() - px(self.up),
            center.x() + px(self.right),
            center.y() + px(self.down),
        )
    }
}

fn fraction(value: f64) -> InterlineFraction {
    InterlineFraction::new(value).unwrap_or(InterlineFraction::ZERO)
}

fn default_pitch_tolerance() -> f32 {
    0.5
}

fn default_dx_tolerance() -> InterlineFraction {
    fraction(0.25)
}

fn default_max_doubt() -> Doubt {
    Doubt::clamped(0.3)
}

fn default_same_staff() -> bool {
    true
}

/// A two-anchor compounding template for one symbol family.
///
/// The template is plain data; [`super::PatternMatcher`] provides the
/// matching behavior shared by all templates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternTemplate {
    name: String,
    targets: ShapeSet,
    #[serde(default = "default_max_doubt")]
    max_doubt: Doubt,
    first: Anchor,
    second: Anchor,
    #[serde(default = "default_pitch_tolerance")]
    pitch_tolerance: f32,
    #[serde(default = "default_dx_tolerance")]
    dx_tolerance: InterlineFraction,
    #[serde(default = "default_same_staff")]
    same_staff: bool,
    #[serde(default)]
    search: SearchRegion,
}

impl PatternTemplate {
    /// Creates a template with default tolerances and an empty search region.
    pub fn new(name: impl Into<String>, targets: ShapeSet, first: Anchor, second: Anchor) -> Self {
        Self {
            name: name.into(),
            targets,
            max_doubt: default_max_doubt(),
            first,
            second,
            pitch_tolerance: default_pitch_tolerance(),
            dx_tolerance: default_dx_tolerance(),
            same_staff: default_same_staff(),
            search: SearchRegion::default(),
        }
    }

    /// Segmented bass clefs, found next to their two vertical dots.
    ///
    /// The dots sit on pitch positions -3 and -1; the clef body lies on the
    /// left of the dots and extends downwards.
    pub fn bass() -> Self {
        let dot = ShapeSet::single(Shape::Dot);
        Self::new(
            "bass",
            ShapeSet::bass_clefs(),
            Anchor::new(dot, -3.0),
            Anchor::new(dot, -1.0),
        )
        .with_search(SearchRegion::new(
            fraction(2.0),
            fraction(0.5),
            InterlineFraction::ZERO,
            fraction(3.0),
        ))
    }

    /// Repeat dot pairs, on both sides of the middle staff line.
    pub fn repeat() -> Self {
        let dot = ShapeSet::single(Shape::Dot);
        Self::new(
            "repeat",
            ShapeSet::single(Shape::RepeatDotPair),
            Anchor::new(dot, -1.0),
            Anchor::new(dot, 1.0),
        )
        .with_search(SearchRegion::new(
            fraction(0.5),
            fraction(0.5),
            InterlineFraction::ZERO,
            fraction(2.5),
        ))
    }

    /// Sets the maximum acceptable doubt (builder style).
    pub fn with_max_doubt(mut self, max_doubt: Doubt) -> Self {
        self.max_doubt = max_doubt;
        self
    }

    /// Sets the pitch position tolerance (builder style).
    pub fn with_pitch_tolerance(mut self, tolerance: f32) -> Self {
        self.pitch_tolerance = tolerance;
        self
    }

    /// Sets the horizontal tolerance between anchors (builder style).
    pub fn with_dx_tolerance(mut self, tolerance: InterlineFraction) -> Self {
        self.dx_tolerance = tolerance;
        self
    }

    /// Sets whether both anchors must belong to the same staff (builder style).
    pub fn with_same_staff(mut self, same_staff: bool) -> Self {
        self.same_staff = same_staff;
        self
    }

    /// Sets the search region (builder style).
    pub fn with_search(mut self, search: SearchRegion) -> Self {
        self.search = search;
        self
    }

    /// Returns the family name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the target shapes.
    pub fn targets(&self) -> ShapeSet {
        self.targets
    }

    /// Returns the maximum acceptable doubt.
    pub fn max_doubt(&self) -> Doubt {
        self.max_doubt
    }

    /// Returns the first (seed) anchor.
    pub fn first(&self) -> &Anchor {
        &self.first
    }

    /// Returns the second anchor.
    pub fn second(&self) -> &Anchor {
        &self.second
    }

    /// Returns the pitch position tolerance.
    pub fn pitch_tolerance(&self) -> f32 {
        self.pitch_tolerance
    }

    /// Returns the horizontal tolerance between anchors.
    pub fn dx_tolerance(&self) -> InterlineFraction {
        self.dx_tolerance
    }

    /// Returns whether both anchors must belong to the same staff.
    pub fn same_staff(&self) -> bool {
        self.same_staff
    }

    /// Returns the search region.
    pub fn search(&self) -> SearchRegion {
        self.search
    }

    /// Returns what the compound builder needs from this template.
    pub fn compound_spec(&self) -> CompoundSpec {
        CompoundSpec::new(self.search, self.targets, self.max_doubt)
    }

    /// Checks the template for values the matcher cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Config`] for an empty name, an empty target set,
    /// empty anchor shape sets or an invalid pitch tolerance.
    pub fn validate(&self) -> Result<(), SigError> {
        if self.name.trim().is_empty() {
            return Err(SigError::Config("pattern name must not be empty".into()));
        }
        if self.targets.is_empty() {
            return Err(SigError::Config(format!(
                "pattern '{}' has no target shape",
                self.name
            )));
        }
        if self.first.shapes.is_empty() || self.second.shapes.is_empty() {
            return Err(SigError::Config(format!(
                "pattern '{}' has an anchor without shapes",
                self.name
            )));
        }
        if !self.pitch_tolerance.is_finite() || self.pitch_tolerance < 0.0 {
            return Err(SigError::Config(format!(
                "pattern '{}' has an invalid pitch tolerance {}",
                self.name, self.pitch_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use omrsig_core::{
        geometry::Size,
        identifier::{GlyphId, StaffId},
    };

    use super::*;
    use crate::glyph::GlyphGeometry;

    fn dot_at(y: f32) -> Glyph {
        let center = Point::new(50.0, y);
        Glyph::new(
            GlyphId::new(1),
            GlyphGeometry::new(center.to_bounds(Size::new(6.0, 6.0)), center, 30),
        )
        .with_evaluation(Shape::Dot, omrsig_core::grade::Grade::new(0.9).unwrap())
    }

    #[test]
    fn test_anchor_matches_pitch_within_tolerance() {
        let staff = Staff::new(StaffId::new(1), 100.0, 180.0, 0.0, 500.0);
        let anchor = Anchor::new(ShapeSet::single(Shape::Dot), -3.0);

        assert!(anchor.matches(&dot_at(110.0), &staff, 0.5)); // pitch -3
        assert!(anchor.matches(&dot_at(114.0), &staff, 0.5)); // pitch -2.6
        assert!(!anchor.matches(&dot_at(116.0), &staff, 0.5)); // pitch -2.4
        assert!(!Anchor::new(ShapeSet::single(Shape::Stem), -3.0).matches(
            &dot_at(110.0),
            &staff,
            0.5
        ));
    }

    #[test]
    fn test_bass_template_defaults() {
        let bass = PatternTemplate::bass();
        assert_eq!(bass.name(), "bass");
        assert!(bass.targets().contains(Shape::FClef));
        assert_eq!(bass.pitch_tolerance(), 0.5);
        assert_eq!(bass.dx_tolerance().get(), 0.25);
        assert!(bass.same_staff());
        assert!(bass.validate().is_ok());

        let area = bass.search().around(Point::new(100.0, 100.0), Scale::new(20).unwrap());
        assert_eq!(area, Bounds::new(60.0, 100.0, 110.0, 160.0));
    }

    #[test]
    fn test_validate_rejects_empty_targets() {
        let dot = ShapeSet::single(Shape::Dot);
        let template = PatternTemplate::new(
            "broken",
            ShapeSet::empty(),
            Anchor::new(dot, 0.0),
            Anchor::new(dot, 1.0),
        );
        assert!(matches!(template.validate(), Err(SigError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_negative_pitch_tolerance() {
        let template = PatternTemplate::bass().with_pitch_tolerance(-1.0);
        assert!(template.validate().is_err());
    }
}
