//! The shape evaluator seam.
//!
//! Shape classification is an external collaborator: omrsig only needs a
//! function from a glyph geometry to a shape label and a grade. Any type
//! implementing [`ShapeEvaluator`] can be plugged in, including plain
//! closures. [`ReferenceEvaluator`] is a small size-based evaluator used by
//! the command-line tool and by tests.

use serde::Deserialize;

use omrsig_core::{
    grade::{Grade, GradeImpacts},
    scale::Scale,
    shape::Shape,
};

use crate::glyph::GlyphGeometry;

/// Result of a shape evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    shape: Shape,
    grade: Grade,
    impacts: Option<GradeImpacts>,
}

impl Evaluation {
    /// Creates an evaluation without detailed impacts.
    pub fn new(shape: Shape, grade: Grade) -> Self {
        Self {
            shape,
            grade,
            impacts: None,
        }
    }

    /// Creates an evaluation graded from its impacts.
    ///
    /// Returns `None` when the impacts combine to a null grade.
    pub fn from_impacts(shape: Shape, impacts: GradeImpacts) -> Option<Self> {
        let grade = impacts.grade()?;
        Some(Self {
            shape,
            grade,
            impacts: Some(impacts),
        })
    }

    /// Returns the evaluated shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the evaluated grade.
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Returns the detailed impacts, if the evaluator provided any.
    pub fn impacts(&self) -> Option<&GradeImpacts> {
        self.impacts.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Shape, Grade, Option<GradeImpacts>) {
        (self.shape, self.grade, self.impacts)
    }
}

/// Assigns a shape and a grade to a glyph geometry.
///
/// Implementations must be pure: the same geometry and scale always yield the
/// same evaluation. `None` means no shape was recognized.
pub trait ShapeEvaluator: Sync {
    /// Evaluates one glyph geometry at the given page scale.
    fn evaluate(&self, geometry: &GlyphGeometry, scale: Scale) -> Option<Evaluation>;
}

impl<F> ShapeEvaluator for F
where
    F: Fn(&GlyphGeometry, Scale) -> Option<Evaluation> + Sync,
{
    fn evaluate(&self, geometry: &GlyphGeometry, scale: Scale) -> Option<Evaluation> {
        self(geometry, scale)
    }
}

/// The expected size of one shape, in interline units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapeReference {
    shape: Shape,
    width: f64,
    height: f64,
    /// Standard deviation of the size fit, in interline units.
    #[serde(default = "default_tolerance")]
    tolerance: f64,
}

fn default_tolerance() -> f64 {
    0.3
}

impl ShapeReference {
    /// Creates a reference for a shape.
    pub fn new(shape: Shape, width: f64, height: f64, tolerance: f64) -> Self {
        Self {
            shape,
            width,
            height,
            tolerance,
        }
    }

    /// Returns the referenced shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    fn impacts(&self, width: f64, height: f64) -> GradeImpacts {
        let fit = |actual: f64, expected: f64| {
            let tolerance = self.tolerance.max(f64::EPSILON);
            let z = (actual - expected) / tolerance;
            (-0.5 * z * z).exp()
        };
        GradeImpacts::new()
            .with("width", fit(width, self.width), 1.0)
            .with("height", fit(height, self.height), 1.0)
    }
}

/// Size-based evaluator matching glyphs against reference shape sizes.
///
/// The glyph bounds are normalized by the interline and compared to every
/// reference; each reference yields a width and a height impact (Gaussian
/// fit) combined into a grade. The best reference wins, earlier references
/// winning ties. Geometries whose best grade stays under the minimum grade are
/// not recognized.
///
/// # Examples
///
/// ```
/// use omrsig::{evaluator::{ReferenceEvaluator, ShapeEvaluator}, glyph::GlyphGeometry};
/// use omrsig_core::{geometry::{Bounds, Point}, scale::Scale, shape::Shape};
///
/// let evaluator = ReferenceEvaluator::builtin();
/// let scale = Scale::new(20).unwrap();
/// let bounds = Bounds::new(96.0, 96.0, 104.0, 104.0);
/// let dot = GlyphGeometry::new(bounds, Point::new(100.0, 100.0), 50);
///
/// let evaluation = evaluator.evaluate(&dot, scale).unwrap();
/// assert_eq!(evaluation.shape(), Shape::Dot);
/// ```
#[derive(Debug, Clone)]
pub struct ReferenceEvaluator {
    references: Vec<ShapeReference>,
    min_grade: f64,
}

impl ReferenceEvaluator {
    /// Creates an evaluator from references.
    pub fn new(references: Vec<ShapeReference>) -> Self {
        Self {
            references,
            min_grade: 0.05,
        }
    }

    /// Sets the grade under which no shape is recognized.
    pub fn with_min_grade(mut self, min_grade: f64) -> Self {
        self.min_grade = min_grade;
        self
    }

    /// Returns the references.
    pub fn references(&self) -> &[ShapeReference] {
        &self.references
    }

    /// Typical sizes of common printed symbols.
    pub fn builtin() -> Self {
        Self::new(builtin_references())
    }
}

/// Reference sizes used when no `[[references]]` are configured.
pub fn builtin_references() -> Vec<ShapeReference> {
    vec![
        ShapeReference::new(Shape::Dot, 0.4, 0.4, 0.15),
        ShapeReference::new(Shape::RepeatDotPair, 0.4, 1.4, 0.2),
        ShapeReference::new(Shape::FClef, 2.4, 3.2, 0.4),
        ShapeReference::new(Shape::GClef, 2.6, 7.0, 0.6),
        ShapeReference::new(Shape::CClef, 2.4, 4.0, 0.4),
        ShapeReference::new(Shape::NoteheadBlack, 1.3, 1.0, 0.2),
        ShapeReference::new(Shape::WholeNote, 1.8, 1.0, 0.2),
        ShapeReference::new(Shape::Stem, 0.15, 3.5, 0.4),
        ShapeReference::new(Shape::ThinBarline, 0.2, 4.0, 0.3),
        ShapeReference::new(Shape::ThickBarline, 0.6, 4.0, 0.3),
        ShapeReference::new(Shape::Bracket, 0.8, 4.6, 0.5),
        ShapeReference::new(Shape::Sharp, 0.9, 2.8, 0.3),
        ShapeReference::new(Shape::Flat, 0.8, 2.4, 0.3),
        ShapeReference::new(Shape::Natural, 0.6, 2.8, 0.3),
    ]
}

impl ShapeEvaluator for ReferenceEvaluator {
    fn evaluate(&self, geometry: &GlyphGeometry, scale: Scale) -> Option<Evaluation> {
        let bounds = geometry.bounds();
        let width = f64::from(scale.to_interlines(bounds.width()));
        let height = f64::from(scale.to_interlines(bounds.height()));

        let mut best: Option<Evaluation> = None;
        for reference in &self.references {
            let Some(candidate) =
                Evaluation::from_impacts(reference.shape, reference.impacts(width, height))
            else {
                continue;
            };
            let better = best
                .as_ref()
                .is_none_or(|current| candidate.grade.total_cmp(&current.grade).is_gt());
            if better {
                best = Some(candidate);
            }
        }

        best.filter(|evaluation| evaluation.grade.value() >= self.min_grade)
    }
}
