//! Symbol shapes and shape families.
//!
//! A [`Shape`] is the label assigned to a glyph by the shape classifier. A
//! [`ShapeSet`] groups shapes into a family (all bass clefs, all noteheads,
//! ...) so that templates and builders can test membership in one step.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Recognized symbol shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Shape {
    Dot,
    RepeatDotPair,
    GClef,
    GClefSmall,
    FClef,
    FClefSmall,
    FClef8va,
    FClef8vb,
    CClef,
    NoteheadBlack,
    NoteheadVoid,
    WholeNote,
    Stem,
    ThinBarline,
    ThickBarline,
    Bracket,
    BracketConnector,
    Brace,
    Sharp,
    Flat,
    Natural,
    Clutter,
}

impl Shape {
    /// All shapes, in declaration order.
    pub const ALL: [Shape; 22] = [
        Shape::Dot,
        Shape::RepeatDotPair,
        Shape::GClef,
        Shape::GClefSmall,
        Shape::FClef,
        Shape::FClefSmall,
        Shape::FClef8va,
        Shape::FClef8vb,
        Shape::CClef,
        Shape::NoteheadBlack,
        Shape::NoteheadVoid,
        Shape::WholeNote,
        Shape::Stem,
        Shape::ThinBarline,
        Shape::ThickBarline,
        Shape::Bracket,
        Shape::BracketConnector,
        Shape::Brace,
        Shape::Sharp,
        Shape::Flat,
        Shape::Natural,
        Shape::Clutter,
    ];

    fn bit(self) -> u64 {
        1 << (self as u8)
    }

    /// Returns the snake_case name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Shape::Dot => "dot",
            Shape::RepeatDotPair => "repeat_dot_pair",
            Shape::GClef => "g_clef",
            Shape::GClefSmall => "g_clef_small",
            Shape::FClef => "f_clef",
            Shape::FClefSmall => "f_clef_small",
            Shape::FClef8va => "f_clef8va",
            Shape::FClef8vb => "f_clef8vb",
            Shape::CClef => "c_clef",
            Shape::NoteheadBlack => "notehead_black",
            Shape::NoteheadVoid => "notehead_void",
            Shape::WholeNote => "whole_note",
            Shape::Stem => "stem",
            Shape::ThinBarline => "thin_barline",
            Shape::ThickBarline => "thick_barline",
            Shape::Bracket => "bracket",
            Shape::BracketConnector => "bracket_connector",
            Shape::Brace => "brace",
            Shape::Sharp => "sharp",
            Shape::Flat => "flat",
            Shape::Natural => "natural",
            Shape::Clutter => "clutter",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of shapes, stored as a bit mask.
///
/// Serialized as a list of shape names.
///
/// # Examples
///
/// ```
/// use omrsig_core::shape::{Shape, ShapeSet};
///
/// let bass = ShapeSet::bass_clefs();
/// assert!(bass.contains(Shape::FClef));
/// assert!(!bass.contains(Shape::GClef));
///
/// let custom: ShapeSet = [Shape::Dot, Shape::Stem].into_iter().collect();
/// assert_eq!(custom.len(), 2);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Shape>", into = "Vec<Shape>")]
pub struct ShapeSet(u64);

impl ShapeSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A set holding a single shape.
    pub fn single(shape: Shape) -> Self {
        Self(shape.bit())
    }

    /// The bass (F) clef family.
    pub fn bass_clefs() -> Self {
        [Shape::FClef, Shape::FClefSmall, Shape::FClef8va, Shape::FClef8vb]
            .into_iter()
            .collect()
    }

    /// The treble (G) clef family.
    pub fn treble_clefs() -> Self {
        [Shape::GClef, Shape::GClefSmall].into_iter().collect()
    }

    /// Returns true if the shape belongs to the set.
    pub fn contains(self, shape: Shape) -> bool {
        self.0 & shape.bit() != 0
    }

    /// Returns a copy of the set with the shape added.
    pub fn with(self, shape: Shape) -> Self {
        Self(self.0 | shape.bit())
    }

    /// Returns true if the set holds no shape.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of shapes in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over the shapes of the set in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Shape> {
        Shape::ALL.into_iter().filter(move |shape| self.contains(*shape))
    }
}

impl FromIterator<Shape> for ShapeSet {
    fn from_iter<I: IntoIterator<Item = Shape>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), ShapeSet::with)
    }
}

impl From<Vec<Shape>> for ShapeSet {
    fn from(shapes: Vec<Shape>) -> Self {
        shapes.into_iter().collect()
    }
}

impl From<ShapeSet> for Vec<Shape> {
    fn from(set: ShapeSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for ShapeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
