//! Page descriptions.
//!
//! A page description is a TOML document listing the page scale and, for
//! each region, its bounds, staves and segmented glyphs:
//!
//! ```toml
//! interline = 20
//!
//! [[regions]]
//! id = 1
//! bounds = { left = 0.0, top = 0.0, right = 1000.0, bottom = 300.0 }
//!
//! [[regions.staves]]
//! id = 1
//! top_line = 100.0
//! bottom_line = 180.0
//! left = 0.0
//! right = 1000.0
//!
//! [[regions.glyphs]]
//! id = 1
//! x = 100.0
//! y = 110.0
//! width = 8.0
//! height = 8.0
//! shape = "dot"
//! grade = 0.8
//! ```
//!
//! Glyph `x` and `y` give the centroid; the bounds are centered on it. The
//! weight defaults to the bounds area. A glyph with a `shape` needs a `grade`
//! unless it is `manual`.

use std::ops::Range;

use log::{debug, info};
use serde::Deserialize;
use toml::Spanned;

use omrsig_core::{
    geometry::{Bounds, Point, Size},
    grade::Grade,
    identifier::{GlyphId, RegionId, StaffId},
    scale::Scale,
    shape::Shape,
};

use crate::{
    error::SigError,
    glyph::{Glyph, GlyphGeometry, GlyphPool},
    region::{Region, Staff},
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageDoc {
    interline: Spanned<u32>,
    #[serde(default)]
    regions: Vec<RegionDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionDoc {
    id: Spanned<u32>,
    bounds: BoundsDoc,
    #[serde(default)]
    staves: Vec<StaffDoc>,
    #[serde(default)]
    glyphs: Vec<GlyphDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoundsDoc {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StaffDoc {
    id: Spanned<u32>,
    top_line: f32,
    bottom_line: f32,
    left: f32,
    right: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GlyphDoc {
    id: Spanned<u32>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    weight: Option<u32>,
    shape: Option<Shape>,
    grade: Option<Spanned<f64>>,
    #[serde(default)]
    manual: bool,
}

/// A page: its scale and independent regions.
#[derive(Debug, Clone)]
pub struct Sheet {
    scale: Scale,
    regions: Vec<Region>,
}

impl Sheet {
    /// Creates a sheet from already validated parts.
    pub fn new(scale: Scale, regions: Vec<Region>) -> Self {
        Self { scale, regions }
    }

    /// Parses and validates a page description.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Input`] for malformed TOML, schema mismatches and
    /// invalid values (null interline, duplicate identifiers, grades outside
    /// `(0, 1]`, shapes without grade). The error carries the byte span of
    /// the offending value when known.
    ///
    /// # Examples
    ///
    /// ```
    /// use omrsig::sheet::Sheet;
    ///
    /// let sheet = Sheet::from_toml_str("interline = 20\n").unwrap();
    /// assert_eq!(sheet.scale().interline(), 20);
    /// assert!(sheet.regions().is_empty());
    ///
    /// assert!(Sheet::from_toml_str("interline = 0\n").is_err());
    /// ```
    pub fn from_toml_str(src: &str) -> Result<Self, SigError> {
        let doc: PageDoc = toml::from_str(src)
            .map_err(|err| SigError::new_input_error(err.message(), err.span(), src))?;

        let scale = Scale::new(*doc.interline.get_ref()).map_err(|err| {
            SigError::new_input_error(err.to_string(), Some(doc.interline.span()), src)
        })?;

        let mut regions: Vec<Region> = Vec::with_capacity(doc.regions.len());
        for region_doc in doc.regions {
            let id = RegionId::new(*region_doc.id.get_ref());
            if regions.iter().any(|region| region.id() == id) {
                return Err(duplicate(format!("region {id}"), region_doc.id.span(), src));
            }
            regions.push(build_region(region_doc, src)?);
        }

        info!(interline = scale.interline(), regions = regions.len(); "Page description loaded");
        Ok(Self { scale, regions })
    }

    /// Returns the page scale.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Returns the regions, in document order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

fn duplicate(what: String, span: Range<usize>, src: &str) -> SigError {
    SigError::new_input_error(format!("duplicate {what}"), Some(span), src)
}

fn build_region(doc: RegionDoc, src: &str) -> Result<Region, SigError> {
    let id = RegionId::new(*doc.id.get_ref());
    let bounds = Bounds::new(
        doc.bounds.left,
        doc.bounds.top,
        doc.bounds.right,
        doc.bounds.bottom,
    );

    let mut staves: Vec<Staff> = Vec::with_capacity(doc.staves.len());
    for staff in &doc.staves {
        let staff_id = StaffId::new(*staff.id.get_ref());
        if staves.iter().any(|known| known.id() == staff_id) {
            return Err(duplicate(format!("{staff_id} in {id}"), staff.id.span(), src));
        }
        staves.push(Staff::new(
            staff_id,
            staff.top_line,
            staff.bottom_line,
            staff.left,
            staff.right,
        ));
    }

    let mut glyphs: Vec<Glyph> = Vec::with_capacity(doc.glyphs.len());
    for glyph in &doc.glyphs {
        let glyph_id = GlyphId::new(*glyph.id.get_ref());
        if glyphs.iter().any(|known| known.id() == glyph_id) {
            return Err(duplicate(format!("glyph {glyph_id} in {id}"), glyph.id.span(), src));
        }
        glyphs.push(build_glyph(glyph, src)?);
    }

    let pool = GlyphPool::new(glyphs)?;
    debug!(
        region = id.get(),
        staves = staves.len(),
        glyphs = pool.len();
        "Region loaded"
    );
    Ok(Region::new(id, bounds, staves, pool))
}

fn build_glyph(doc: &GlyphDoc, src: &str) -> Result<Glyph, SigError> {
    let id = GlyphId::new(*doc.id.get_ref());
    let centroid = Point::new(doc.x, doc.y);
    let size = Size::new(doc.width.abs(), doc.height.abs());
    let weight = doc
        .weight
        .unwrap_or_else(|| size.area().round().max(0.0) as u32);
    let glyph = Glyph::new(
        id,
        GlyphGeometry::new(centroid.to_bounds(size), centroid, weight),
    );

    let grade = match &doc.grade {
        Some(grade) => Some(Grade::new(*grade.get_ref()).map_err(|err| {
            SigError::new_input_error(err.to_string(), Some(grade.span()), src)
        })?),
        None => None,
    };

    match (doc.shape, grade, doc.manual) {
        (Some(shape), _, true) => Ok(glyph.with_manual_shape(shape)),
        (Some(shape), Some(grade), false) => Ok(glyph.with_evaluation(shape, grade)),
        (Some(_), None, false) => Err(SigError::new_input_error(
            format!("glyph {id} has a shape but no grade"),
            Some(doc.id.span()),
            src,
        )),
        (None, Some(_), _) => Err(SigError::new_input_error(
            format!("glyph {id} has a grade but no shape"),
            doc.grade.as_ref().map(Spanned::span),
            src,
        )),
        (None, None, true) => Err(SigError::new_input_error(
            format!("glyph {id} is manual but has no shape"),
            Some(doc.id.span()),
            src,
        )),
        (None, None, false) => Ok(glyph),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
interline = 20

[[regions]]
id = 1
bounds = { left = 0.0, top = 0.0, right = 1000.0, bottom = 300.0 }

[[regions.staves]]
id = 1
top_line = 100.0
bottom_line = 180.0
left = 0.0
right = 1000.0

[[regions.glyphs]]
id = 2
x = 104.0
y = 130.0
width = 8.0
height = 8.0
shape = "dot"
grade = 0.8

[[regions.glyphs]]
id = 1
x = 100.0
y = 110.0
width = 8.0
height = 8.0
weight = 50
shape = "dot"
grade = 0.8

[[regions.glyphs]]
id = 3
x = 60.0
y = 140.0
width = 40.0
height = 60.0
shape = "sharp"
manual = true
"#;

    #[test]
    fn test_parse_page() {
        let sheet = Sheet::from_toml_str(PAGE).unwrap();
        assert_eq!(sheet.scale().interline(), 20);
        assert_eq!(sheet.regions().len(), 1);

        let region = &sheet.regions()[0];
        assert_eq!(region.staves().len(), 1);
        assert_eq!(region.pool().len(), 3);

        let first = region.pool().at(0).unwrap();
        assert_eq!(first.id(), GlyphId::new(1));
        assert_eq!(first.geometry().weight(), 50);
        assert_eq!(first.bounds(), Bounds::new(96.0, 106.0, 104.0, 114.0));

        let second = region.pool().get(GlyphId::new(2)).unwrap();
        assert_eq!(second.geometry().weight(), 64);

        let manual = region.pool().get(GlyphId::new(3)).unwrap();
        assert!(manual.is_manual());
        assert_eq!(manual.grade(), Some(Grade::MAX));
    }

    #[test]
    fn test_syntax_error_has_span() {
        let err = Sheet::from_toml_str("interline = \n").unwrap_err();
        assert!(matches!(err, SigError::Input { span: Some(_), .. }));
    }

    #[test]
    fn test_zero_interline_is_rejected() {
        let src = "interline = 0\n";
        let err = Sheet::from_toml_str(src).unwrap_err();
        let SigError::Input { span, .. } = err else {
            panic!("expected an input error");
        };
        assert_eq!(span.map(|span| &src[span]), Some("0"));
    }

    #[test]
    fn test_grade_out_of_range_is_rejected() {
        let src = PAGE.replacen("grade = 0.8", "grade = 1.5", 1);
        let err = Sheet::from_toml_str(&src).unwrap_err();
        let SigError::Input { span, .. } = err else {
            panic!("expected an input error");
        };
        assert_eq!(span.map(|span| &src[span]), Some("1.5"));
    }

    #[test]
    fn test_duplicate_glyph_is_rejected() {
        let src = PAGE.replacen("id = 2\nx", "id = 1\nx", 1);
        let err = Sheet::from_toml_str(&src).unwrap_err();
        assert!(matches!(err, SigError::Input { message, .. } if message.contains("duplicate")));
    }

    #[test]
    fn test_shape_without_grade_is_rejected() {
        let src = PAGE.replacen("grade = 0.8\n", "", 1);
        assert!(matches!(
            Sheet::from_toml_str(&src),
            Err(SigError::Input { .. })
        ));
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        let src = PAGE.replacen("shape = \"sharp\"", "shape = \"quaver\"", 1);
        assert!(Sheet::from_toml_str(&src).is_err());
    }
}
