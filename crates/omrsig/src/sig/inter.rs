//! Interpretations and their handles.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::Serialize;

use omrsig_core::{
    geometry::Bounds,
    grade::{Grade, GradeImpacts},
    identifier::{GlyphId, RegionId, StaffId},
    shape::Shape,
};

use crate::{compound::Compound, glyph::Glyph};

/// Stable handle of an interpretation within its region graph.
///
/// Handles are allocated in insertion order and stay valid for the lifetime
/// of the graph, since interpretations are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterId(NodeIndex);

impl InterId {
    pub(crate) fn from_node(node: NodeIndex) -> Self {
        Self(node)
    }

    pub(crate) fn node(self) -> NodeIndex {
        self.0
    }

    /// Returns the insertion rank of the interpretation.
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Display for InterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inter-{}", self.0.index())
    }
}

impl Serialize for InterId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0.index() as u64)
    }
}

/// Where an interpretation comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterOrigin {
    /// A classified primitive glyph.
    Primitive { glyph: GlyphId },

    /// A compound accepted by the named pattern template.
    Compound { template: String },

    /// A connector found between two other interpretations.
    Connector,
}

/// Lifecycle of an interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterState {
    Alive,
    Removed,
}

/// A candidate interpretation: a shape assigned to some glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct Inter {
    shape: Shape,
    grade: Grade,
    contextual: Grade,
    bounds: Bounds,
    region: RegionId,
    staff: Option<StaffId>,
    manual: bool,
    members: Vec<GlyphId>,
    impacts: Option<GradeImpacts>,
    origin: InterOrigin,
    state: InterState,
}

impl Inter {
    /// Creates an alive, automatic interpretation without members.
    pub fn new(
        shape: Shape,
        grade: Grade,
        bounds: Bounds,
        region: RegionId,
        origin: InterOrigin,
    ) -> Self {
        Self {
            shape,
            grade,
            contextual: grade,
            bounds,
            region,
            staff: None,
            manual: false,
            members: Vec::new(),
            impacts: None,
            origin,
            state: InterState::Alive,
        }
    }

    /// Interprets a classified primitive glyph.
    ///
    /// Returns `None` for glyphs without shape or grade.
    pub fn from_glyph(glyph: &Glyph, region: RegionId, staff: Option<StaffId>) -> Option<Self> {
        let shape = glyph.shape()?;
        let grade = glyph.grade()?;
        let inter = Self::new(
            shape,
            grade,
            glyph.bounds(),
            region,
            InterOrigin::Primitive { glyph: glyph.id() },
        )
        .with_staff(staff)
        .with_members(vec![glyph.id()])
        .with_manual(glyph.is_manual());
        Some(inter)
    }

    /// Interprets a compound accepted by a template.
    pub fn from_compound(
        compound: &Compound,
        template: &str,
        region: RegionId,
        staff: Option<StaffId>,
    ) -> Self {
        let mut inter = Self::new(
            compound.shape(),
            compound.grade(),
            compound.geometry().bounds(),
            region,
            InterOrigin::Compound {
                template: template.to_string(),
            },
        )
        .with_staff(staff)
        .with_members(compound.members().to_vec());
        inter.impacts = compound.impacts().cloned();
        inter
    }

    /// Sets the staff (builder style).
    pub fn with_staff(mut self, staff: Option<StaffId>) -> Self {
        self.staff = staff;
        self
    }

    /// Sets the member glyphs (builder style); kept sorted and unique.
    pub fn with_members(mut self, mut members: Vec<GlyphId>) -> Self {
        members.sort_unstable();
        members.dedup();
        self.members = members;
        self
    }

    /// Sets the grade impacts (builder style).
    pub fn with_impacts(mut self, impacts: GradeImpacts) -> Self {
        self.impacts = Some(impacts);
        self
    }

    /// Marks the interpretation as fixed by a human (builder style).
    pub fn with_manual(mut self, manual: bool) -> Self {
        self.manual = manual;
        self
    }

    /// Returns the interpreted shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the raw grade.
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Returns the grade boosted by support, as of the last reduction pass.
    pub fn contextual_grade(&self) -> Grade {
        self.contextual
    }

    /// Returns the bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the owning region.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Returns the owning staff, if any.
    pub fn staff(&self) -> Option<StaffId> {
        self.staff
    }

    /// Returns true if the interpretation was fixed by a human.
    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Returns the member glyph identifiers, sorted.
    pub fn members(&self) -> &[GlyphId] {
        &self.members
    }

    /// Returns the grade impacts, if any.
    pub fn impacts(&self) -> Option<&GradeImpacts> {
        self.impacts.as_ref()
    }

    /// Returns the origin.
    pub fn origin(&self) -> &InterOrigin {
        &self.origin
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> InterState {
        self.state
    }

    /// Returns true while the interpretation has not been removed.
    pub fn is_alive(&self) -> bool {
        self.state == InterState::Alive
    }

    /// Returns true if both interpretations claim a common glyph.
    pub fn shares_member(&self, other: &Inter) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.members.len() && j < other.members.len() {
            match self.members[i].cmp(&other.members[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }

    pub(crate) fn set_contextual(&mut self, grade: Grade) {
        self.contextual = grade;
    }

    pub(crate) fn remove(&mut self) {
        self.state = InterState::Removed;
    }
}
