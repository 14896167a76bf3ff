//! Geometric primitives for glyph and symbol placement on a page.
//!
//! # Overview
//!
//! - [`Point`] - A 2D pixel coordinate on the page
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! Page coordinates follow the raster convention:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Y increases downward, so a staff line above another one has a smaller
//! ordinate and a negative pitch position relative to it.

use serde::{Deserialize, Serialize};

/// A 2D point in page pixel space.
///
/// # Examples
///
/// ```
/// # use omrsig_core::geometry::{Point, Size};
/// let centroid = Point::new(10.0, 20.0);
///
/// let dot = centroid.to_bounds(Size::new(4.0, 6.0));
/// assert_eq!(dot.min_x(), 8.0);
/// assert_eq!(dot.max_y(), 23.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Converts a point and size into a bounds rectangle centered on the point.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_center(self, size)
    }
}

/// Width and height of a rectangular area, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the area covered by this size, zero for degenerate sizes.
    pub fn area(self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// A rectangular bounding box with minimum and maximum coordinates.
///
/// Bounds are closed: two boxes sharing only an edge intersect, and a
/// zero-width box still intersects anything it touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from explicit coordinates, normalizing swapped extremes.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Returns the area of the bounds.
    pub fn area(self) -> f32 {
        self.to_size().area()
    }

    /// Merges two bounds into the smallest bounds containing both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use omrsig_core::geometry::{Bounds, Point, Size};
    /// let dot = Bounds::new(0.0, 0.0, 4.0, 4.0);
    /// let body = Point::new(-11.0, 18.0).to_bounds(Size::new(18.0, 40.0));
    ///
    /// let combined = dot.merge(&body);
    /// assert_eq!(combined.min_x(), -20.0);
    /// assert_eq!(combined.min_y(), -2.0);
    /// assert_eq!(combined.width(), 24.0);
    /// assert_eq!(combined.height(), 40.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Checks whether two (closed) bounds share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Returns the common area of two bounds, or `None` if they are disjoint.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Ratio of the common area to the smaller of the two areas.
    ///
    /// Returns 0 for disjoint bounds and for degenerate (zero-area) operands.
    ///
    /// # Examples
    ///
    /// ```
    /// # use omrsig_core::geometry::{Bounds, Point, Size};
    /// let big = Bounds::new(0.0, 0.0, 10.0, 10.0);
    /// let inner = Point::new(4.0, 4.0).to_bounds(Size::new(4.0, 4.0));
    /// assert_eq!(big.overlap_ratio(&inner), 1.0);
    /// ```
    pub fn overlap_ratio(&self, other: &Self) -> f32 {
        let smaller = self.area().min(other.area());
        if smaller <= 0.0 {
            return 0.0;
        }
        self.intersection(other)
            .map_or(0.0, |common| (common.area() / smaller).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_new_normalizes() {
        let bounds = Bounds::new(10.0, 20.0, 2.0, 4.0);
        assert_eq!(bounds.min_x(), 2.0);
        assert_eq!(bounds.min_y(), 4.0);
        assert_eq!(bounds.max_x(), 10.0);
        assert_eq!(bounds.max_y(), 20.0);
    }

    #[test]
    fn test_bounds_from_center() {
        let bounds = Point::new(10.0, 15.0).to_bounds(Size::new(8.0, 12.0));
        assert_eq!(bounds.min_x(), 6.0); // 10 - 4
        assert_eq!(bounds.min_y(), 9.0); // 15 - 6
        assert_eq!(bounds.max_x(), 14.0);
        assert_eq!(bounds.max_y(), 21.0);
        assert_eq!(bounds.center(), Point::new(10.0, 15.0));
    }

    #[test]
    fn test_intersects_touching_edges() {
        let left = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let right = Bounds::new(10.0, 0.0, 20.0, 10.0);
        let far = Bounds::new(10.5, 0.0, 20.0, 10.0);

        assert!(left.intersects(&right));
        assert!(right.intersects(&left));
        assert!(!left.intersects(&far));
    }

    #[test]
    fn test_zero_width_region_catches_owner() {
        // A degenerate box anchored on a centroid still hits the glyph holding it
        let glyph = Bounds::new(98.0, 98.0, 102.0, 102.0);
        let region = Bounds::new(100.0, 100.0, 100.0, 160.0);
        assert!(glyph.intersects(&region));
    }

    #[test]
    fn test_intersection() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 15.0, 15.0);
        let common = a.intersection(&b).unwrap();
        assert_eq!(common, Bounds::new(5.0, 5.0, 10.0, 10.0));

        let c = Bounds::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_overlap_ratio() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 0.0, 15.0, 10.0);
        assert_eq!(a.overlap_ratio(&b), 0.5);

        let disjoint = Bounds::new(50.0, 50.0, 60.0, 60.0);
        assert_eq!(a.overlap_ratio(&disjoint), 0.0);

        let line = Bounds::new(5.0, 0.0, 5.0, 10.0);
        assert_eq!(a.overlap_ratio(&line), 0.0);
    }
}
