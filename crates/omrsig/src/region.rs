//! Staves and page regions.
//!
//! A [`Region`] is an independent subdivision of the page (typically one
//! system) with its own staves and glyph pool. Regions share no mutable state,
//! which is what allows the page pipeline to process them in parallel.

use omrsig_core::{
    geometry::{Bounds, Point},
    identifier::{RegionId, StaffId},
};

use crate::glyph::{Glyph, GlyphPool};

/// A five-line staff, described by the ordinates of its outer lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Staff {
    id: StaffId,
    top_line: f32,
    bottom_line: f32,
    left: f32,
    right: f32,
}

impl Staff {
    /// Creates a staff from its outer line ordinates and abscissa range.
    pub fn new(id: StaffId, top_line: f32, bottom_line: f32, left: f32, right: f32) -> Self {
        Self {
            id,
            top_line: top_line.min(bottom_line),
            bottom_line: top_line.max(bottom_line),
            left: left.min(right),
            right: left.max(right),
        }
    }

    /// Returns the staff identifier.
    pub fn id(&self) -> StaffId {
        self.id
    }

    /// Ordinate of the top line.
    pub fn top_line(&self) -> f32 {
        self.top_line
    }

    /// Ordinate of the bottom line.
    pub fn bottom_line(&self) -> f32 {
        self.bottom_line
    }

    /// Ordinate of the middle line.
    pub fn middle(&self) -> f32 {
        (self.top_line + self.bottom_line) / 2.0
    }

    /// Distance between two consecutive lines of this staff.
    pub fn interline(&self) -> f32 {
        (self.bottom_line - self.top_line) / 4.0
    }

    /// Bounds covered by the staff lines.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.left, self.top_line, self.right, self.bottom_line)
    }

    /// Pitch position of an ordinate, in half interlines.
    ///
    /// 0 is the middle line, -4 the top line and +4 the bottom line.
    ///
    /// # Examples
    ///
    /// ```
    /// use omrsig::region::Staff;
    /// use omrsig_core::identifier::StaffId;
    ///
    /// let staff = Staff::new(StaffId::new(1), 100.0, 180.0, 0.0, 1000.0);
    /// assert_eq!(staff.pitch_position(100.0), -4.0);
    /// assert_eq!(staff.pitch_position(110.0), -3.0);
    /// assert_eq!(staff.pitch_position(140.0), 0.0);
    /// ```
    pub fn pitch_position(&self, y: f32) -> f32 {
        let interline = self.interline();
        if interline <= 0.0 {
            return 0.0;
        }
        2.0 * (y - self.middle()) / interline
    }
}

/// An independent page region with its staves and glyphs.
#[derive(Debug, Clone)]
pub struct Region {
    id: RegionId,
    bounds: Bounds,
    staves: Vec<Staff>,
    pool: GlyphPool,
}

impl Region {
    /// Creates a region; staves are sorted from top to bottom.
    pub fn new(id: RegionId, bounds: Bounds, mut staves: Vec<Staff>, pool: GlyphPool) -> Self {
        staves.sort_by(|a, b| a.top_line.total_cmp(&b.top_line));
        Self {
            id,
            bounds,
            staves,
            pool,
        }
    }

    /// Returns the region identifier.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Returns the region bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the staves, from top to bottom.
    pub fn staves(&self) -> &[Staff] {
        &self.staves
    }

    /// Returns the glyph pool.
    pub fn pool(&self) -> &GlyphPool {
        &self.pool
    }

    /// Returns the staff with the given identifier.
    pub fn staff(&self, id: StaffId) -> Option<&Staff> {
        self.staves.iter().find(|staff| staff.id == id)
    }

    /// Returns the staff whose area contains the ordinate.
    ///
    /// The region is split vertically at mid-distance between consecutive
    /// staves; the first and last staff areas extend to the region edges.
    /// Ordinates outside the region, or regions without staves, have no
    /// staff.
    pub fn staff_at_y(&self, y: f32) -> Option<&Staff> {
        if y < self.bounds.min_y() || y > self.bounds.max_y() {
            return None;
        }
        let idx = self
            .staves
            .windows(2)
            .position(|pair| y < (pair[0].bottom_line + pair[1].top_line) / 2.0)
            .unwrap_or(self.staves.len().saturating_sub(1));
        self.staves.get(idx)
    }

    /// Returns the staff owning a point.
    pub fn staff_at(&self, point: Point) -> Option<&Staff> {
        self.staff_at_y(point.y())
    }

    /// Returns the staff owning a glyph, derived from its centroid.
    pub fn staff_of(&self, glyph: &Glyph) -> Option<&Staff> {
        self.staff_at(glyph.centroid())
    }
}
