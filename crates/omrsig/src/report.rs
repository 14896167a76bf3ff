//! Survivor reports.
//!
//! A [`PageReport`] is the serializable summary of a processed page: for
//! each region, the matcher statistics, the surviving interpretations and
//! the unresolved conflicts.

use serde::Serialize;

use omrsig_core::{
    geometry::Bounds,
    grade::Grade,
    identifier::{GlyphId, RegionId, StaffId},
    scale::Scale,
    shape::Shape,
};

use crate::{
    error::SigError,
    pipeline::{PageResult, RegionResult},
    sig::{Conflict, Inter, InterId, InterOrigin},
};

/// Serializable summary of a page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    interline: u32,
    regions: Vec<RegionReport>,
}

/// Serializable summary of a region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    id: RegionId,
    iterations: usize,
    matches: Vec<MatchSummary>,
    survivors: Vec<SurvivorEntry>,
    conflicts: Vec<Conflict>,
}

/// Statistics of one matcher pass.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    template: String,
    pairs: usize,
    compounds: usize,
}

/// One surviving interpretation.
#[derive(Debug, Clone, Serialize)]
pub struct SurvivorEntry {
    inter: InterId,
    shape: Shape,
    grade: Grade,
    contextual_grade: Grade,
    #[serde(skip_serializing_if = "Option::is_none")]
    staff: Option<StaffId>,
    manual: bool,
    bounds: Bounds,
    members: Vec<GlyphId>,
    origin: InterOrigin,
}

impl SurvivorEntry {
    fn new(id: InterId, inter: &Inter) -> Self {
        Self {
            inter: id,
            shape: inter.shape(),
            grade: inter.grade(),
            contextual_grade: inter.contextual_grade(),
            staff: inter.staff(),
            manual: inter.is_manual(),
            bounds: inter.bounds(),
            members: inter.members().to_vec(),
            origin: inter.origin().clone(),
        }
    }

    /// Returns the interpretation handle within its region.
    pub fn inter(&self) -> InterId {
        self.inter
    }

    /// Returns the interpreted shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the member glyphs.
    pub fn members(&self) -> &[GlyphId] {
        &self.members
    }
}

impl RegionReport {
    fn new(result: &RegionResult) -> Self {
        Self {
            id: result.region(),
            iterations: result.report().iterations(),
            matches: result
                .outcomes()
                .iter()
                .map(|outcome| MatchSummary {
                    template: outcome.template().to_string(),
                    pairs: outcome.pairs(),
                    compounds: outcome.success_count(),
                })
                .collect(),
            survivors: result
                .survivors()
                .map(|(id, inter)| SurvivorEntry::new(id, inter))
                .collect(),
            conflicts: result.report().conflicts().to_vec(),
        }
    }

    /// Returns the region identifier.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Returns the survivors, in handle order.
    pub fn survivors(&self) -> &[SurvivorEntry] {
        &self.survivors
    }

    /// Returns the unresolved conflicts.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}

impl PageReport {
    /// Summarizes a processed page.
    pub fn new(result: &PageResult, scale: Scale) -> Self {
        Self {
            interline: scale.interline(),
            regions: result.regions().iter().map(RegionReport::new).collect(),
        }
    }

    /// Returns the region summaries, in region order.
    pub fn regions(&self) -> &[RegionReport] {
        &self.regions
    }

    /// Renders the report as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Report`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, SigError> {
        toml::to_string_pretty(self).map_err(|err| SigError::Report(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig, pattern::PatternRegistry, pipeline::PageProcessor, sheet::Sheet,
    };

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
id = 1
x = 100.0
y = 110.0
width = 8.0
height = 8.0
shape = "dot"
grade = 0.7

[[regions.glyphs]]
id = 2
x = 100.0
y = 112.0
width = 8.0
height = 8.0
shape = "sharp"
manual = true

[[regions.glyphs]]
id = 3
x = 100.0
y = 111.0
width = 8.0
height = 8.0
shape = "flat"
manual = true
"#;

    #[test]
    fn test_report_lists_survivors_and_conflicts() {
        let sheet = Sheet::from_toml_str(PAGE).unwrap();
        let config = AppConfig::default();
        let registry = PatternRegistry::builtin();
        let evaluator = config.evaluator();
        let page = PageProcessor::new(&registry, &evaluator, &config)
            .process(&sheet)
            .unwrap();

        let report = PageReport::new(&page, sheet.scale());
        let region = &report.regions()[0];
        let shapes: Vec<_> = region.survivors().iter().map(SurvivorEntry::shape).collect();
        assert_eq!(shapes, vec![Shape::Sharp, Shape::Flat]);
        assert_eq!(region.conflicts().len(), 1);

        let text = report.to_toml().unwrap();
        assert!(text.contains("interline = 20"));
        assert!(text.contains("shape = \"sharp\""));
        assert!(text.contains("kind = \"manual_exclusion\""));
        assert!(!text.contains("shape = \"dot\""));
    }
}
