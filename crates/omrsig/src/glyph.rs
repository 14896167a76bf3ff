//! Glyphs, glyph pools and per-pass reservations.
//!
//! A [`Glyph`] is a connected pixel region produced by segmentation
//! (a primitive) or by the compound builder (the union of several
//! primitives). Glyph geometry is immutable once created.
//!
//! Each region owns one [`GlyphPool`], kept sorted by identifier so that
//! every scan over it is deterministic. Candidate consumption during a
//! matcher pass is tracked outside the glyphs, in a [`Reservation`] indexed
//! by pool position.

use log::trace;

use omrsig_core::{
    geometry::{Bounds, Point},
    grade::Grade,
    identifier::GlyphId,
    shape::{Shape, ShapeSet},
};

use crate::error::SigError;

/// The geometric description of a glyph, as handed to the shape evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphGeometry {
    bounds: Bounds,
    centroid: Point,
    weight: u32,
}

impl GlyphGeometry {
    /// Creates a geometry from bounds, centroid and weight (pixel count).
    pub fn new(bounds: Bounds, centroid: Point, weight: u32) -> Self {
        Self {
            bounds,
            centroid,
            weight,
        }
    }

    /// Returns the bounding box.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the mass center.
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    /// Returns the number of foreground pixels.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Unites several geometries into one.
    ///
    /// Bounds are merged, weights summed and the centroid is the
    /// weight-averaged centroid of the parts (plain average when every part
    /// is weightless). Returns `None` for an empty input.
    pub fn union<'a>(parts: impl IntoIterator<Item = &'a GlyphGeometry>) -> Option<Self> {
        let mut parts = parts.into_iter();
        let first = parts.next()?;

        let mut bounds = first.bounds;
        let mut weight = u64::from(first.weight);
        let mut count = 1.0f64;
        let mut weighted = (
            f64::from(first.centroid.x()) * f64::from(first.weight),
            f64::from(first.centroid.y()) * f64::from(first.weight),
        );
        let mut plain = (
            f64::from(first.centroid.x()),
            f64::from(first.centroid.y()),
        );

        for part in parts {
            bounds = bounds.merge(&part.bounds);
            weight += u64::from(part.weight);
            count += 1.0;
            weighted.0 += f64::from(part.centroid.x()) * f64::from(part.weight);
            weighted.1 += f64::from(part.centroid.y()) * f64::from(part.weight);
            plain.0 += f64::from(part.centroid.x());
            plain.1 += f64::from(part.centroid.y());
        }

        let centroid = if weight > 0 {
            let total = weight as f64;
            Point::new((weighted.0 / total) as f32, (weighted.1 / total) as f32)
        } else {
            Point::new((plain.0 / count) as f32, (plain.1 / count) as f32)
        };

        Some(Self {
            bounds,
            centroid,
            weight: u32::try_from(weight).unwrap_or(u32::MAX),
        })
    }
}

/// A primitive or compound glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    id: GlyphId,
    geometry: GlyphGeometry,
    shape: Option<Shape>,
    grade: Option<Grade>,
    manual: bool,
}

impl Glyph {
    /// Creates an unclassified glyph.
    pub fn new(id: GlyphId, geometry: GlyphGeometry) -> Self {
        Self {
            id,
            geometry,
            shape: None,
            grade: None,
            manual: false,
        }
    }

    /// Sets the evaluated shape and grade (builder style).
    pub fn with_evaluation(mut self, shape: Shape, grade: Grade) -> Self {
        self.shape = Some(shape);
        self.grade = Some(grade);
        self
    }

    /// Marks the shape as assigned by a human (builder style).
    ///
    /// Manual shapes carry the maximum grade and are never revised by the
    /// automatic stages.
    pub fn with_manual_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self.grade = Some(Grade::MAX);
        self.manual = true;
        self
    }

    /// Returns the glyph identifier.
    pub fn id(&self) -> GlyphId {
        self.id
    }

    /// Returns the glyph geometry.
    pub fn geometry(&self) -> &GlyphGeometry {
        &self.geometry
    }

    /// Returns the bounding box.
    pub fn bounds(&self) -> Bounds {
        self.geometry.bounds
    }

    /// Returns the mass center.
    pub fn centroid(&self) -> Point {
        self.geometry.centroid
    }

    /// Returns the assigned shape, if any.
    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    /// Returns the grade of the assigned shape, if any.
    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }

    /// Returns true if the shape was assigned manually.
    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Returns true if the glyph has a shape within `shapes`.
    pub fn has_shape_in(&self, shapes: ShapeSet) -> bool {
        self.shape.is_some_and(|shape| shapes.contains(shape))
    }
}

/// The glyphs of one region, sorted by ascending identifier.
#[derive(Debug, Clone, Default)]
pub struct GlyphPool {
    glyphs: Vec<Glyph>,
}

impl GlyphPool {
    /// Creates a pool, sorting glyphs by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::DuplicateGlyph`] if two glyphs share an identifier.
    pub fn new(mut glyphs: Vec<Glyph>) -> Result<Self, SigError> {
        glyphs.sort_by_key(Glyph::id);
        if let Some(pair) = glyphs.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(SigError::DuplicateGlyph { id: pair[0].id });
        }
        Ok(Self { glyphs })
    }

    /// Returns the number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if the pool holds no glyph.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Iterates over glyphs in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.iter()
    }

    /// Iterates over `(position, glyph)` pairs in ascending identifier order.
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &Glyph)> {
        self.glyphs.iter().enumerate()
    }

    /// Returns the position of a glyph in the pool.
    pub fn position(&self, id: GlyphId) -> Option<usize> {
        self.glyphs.binary_search_by_key(&id, Glyph::id).ok()
    }

    /// Returns the glyph with the given identifier.
    pub fn get(&self, id: GlyphId) -> Option<&Glyph> {
        self.position(id).map(|idx| &self.glyphs[idx])
    }

    /// Returns the glyph at the given pool position.
    pub fn at(&self, position: usize) -> Option<&Glyph> {
        self.glyphs.get(position)
    }
}

/// Glyphs consumed during one matcher pass.
///
/// A reservation is created for a pool at the start of a pass and threaded
/// through every compound build of that pass; a glyph reserved by an
/// accepted compound is no longer available to any later build.
#[derive(Debug, Clone)]
pub struct Reservation {
    reserved: Vec<bool>,
}

impl Reservation {
    /// Creates an empty reservation for the given pool.
    pub fn for_pool(pool: &GlyphPool) -> Self {
        Self {
            reserved: vec![false; pool.len()],
        }
    }

    /// Returns true if the glyph at this pool position is reserved.
    pub fn is_reserved(&self, position: usize) -> bool {
        self.reserved.get(position).copied().unwrap_or(false)
    }

    /// Reserves all given pool positions.
    pub fn reserve_all(&mut self, positions: &[usize]) {
        for &position in positions {
            if let Some(slot) = self.reserved.get_mut(position) {
                *slot = true;
            }
        }
        trace!(count = positions.len(); "Reserved glyphs");
    }

    /// Number of reserved glyphs.
    pub fn reserved_count(&self) -> usize {
        self.reserved.iter().filter(|reserved| **reserved).count()
    }
}
