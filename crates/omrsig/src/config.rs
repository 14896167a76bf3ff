//! Configuration types for omrsig processing.
//!
//! All types implement [`serde::Deserialize`] and every section falls back to
//! its defaults when absent, so an empty document is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`ReductionConfig`] - Bounds and gain of the reduction engine.
//! - [`RelationConfig`] - Thresholds used when deriving exclusions.
//! - [`ConnectorConfig`] - Tolerances and acceptance of bracket connectors.
//!
//! Pattern templates (`[[patterns]]`) and evaluator references
//! (`[[references]]`) default to the built-in sets.
//!
//! # Example
//!
//! ```
//! # use omrsig::config::AppConfig;
//! let config = AppConfig::from_toml_str("[reduction]\nmax_iterations = 10\n").unwrap();
//! assert_eq!(config.reduction().max_iterations(), 10);
//! assert_eq!(config.registry().unwrap().len(), 2);
//! ```

use serde::Deserialize;

use crate::{
    error::SigError,
    evaluator::{ReferenceEvaluator, ShapeReference, builtin_references},
    pattern::{PatternRegistry, PatternTemplate},
};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Reduction engine section.
    #[serde(default)]
    reduction: ReductionConfig,

    /// Relation derivation section.
    #[serde(default)]
    relations: RelationConfig,

    /// Bracket connector section.
    #[serde(default)]
    connectors: ConnectorConfig,

    /// Pattern templates, in running order.
    #[serde(default = "builtin_patterns")]
    patterns: Vec<PatternTemplate>,

    /// Shape references for the reference evaluator.
    #[serde(default = "builtin_references")]
    references: Vec<ShapeReference>,
}

fn builtin_patterns() -> Vec<PatternTemplate> {
    PatternRegistry::builtin().iter().cloned().collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reduction: ReductionConfig::default(),
            relations: RelationConfig::default(),
            connectors: ConnectorConfig::default(),
            patterns: builtin_patterns(),
            references: builtin_references(),
        }
    }
}

impl AppConfig {
    /// Parses a configuration document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Config`] if the document is not valid TOML, does
    /// not match the configuration schema or holds invalid values.
    pub fn from_toml_str(content: &str) -> Result<Self, SigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| SigError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section for values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), SigError> {
        self.reduction.validate()?;
        self.relations.validate()?;
        self.connectors.validate()?;
        for template in &self.patterns {
            template.validate()?;
        }
        Ok(())
    }

    /// Returns the reduction configuration.
    pub fn reduction(&self) -> &ReductionConfig {
        &self.reduction
    }

    /// Returns the relation derivation configuration.
    pub fn relations(&self) -> &RelationConfig {
        &self.relations
    }

    /// Returns the connector configuration.
    pub fn connectors(&self) -> &ConnectorConfig {
        &self.connectors
    }

    /// Returns the configured pattern templates.
    pub fn patterns(&self) -> &[PatternTemplate] {
        &self.patterns
    }

    /// Returns the configured shape references.
    pub fn references(&self) -> &[ShapeReference] {
        &self.references
    }

    /// Builds the template registry from the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`SigError::Config`] for invalid or duplicate templates.
    pub fn registry(&self) -> Result<PatternRegistry, SigError> {
        PatternRegistry::from_templates(self.patterns.iter().cloned())
    }

    /// Builds the reference evaluator from the configured references.
    pub fn evaluator(&self) -> ReferenceEvaluator {
        ReferenceEvaluator::new(self.references.clone())
    }
}

/// Reduction engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReductionConfig {
    /// Maximum number of reduction passes.
    max_iterations: usize,

    /// Gain applied to the total incoming support.
    support_gain: f64,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            max_iterations: 64,
            support_gain: 0.5,
        }
    }
}

impl ReductionConfig {
    /// Creates a reduction configuration.
    pub fn new(max_iterations: usize, support_gain: f64) -> Self {
        Self {
            max_iterations,
            support_gain,
        }
    }

    /// Returns the maximum number of passes.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Returns the support gain.
    pub fn support_gain(&self) -> f64 {
        self.support_gain
    }

    fn validate(&self) -> Result<(), SigError> {
        if self.max_iterations == 0 {
            return Err(SigError::Config(
                "reduction.max_iterations must be at least 1".into(),
            ));
        }
        if !self.support_gain.is_finite() || self.support_gain < 0.0 {
            return Err(SigError::Config(format!(
                "reduction.support_gain must be a non-negative number, got {}",
                self.support_gain
            )));
        }
        Ok(())
    }
}

/// Relation derivation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelationConfig {
    /// Minimum overlap ratio for two inters to exclude each other.
    min_overlap: f64,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self { min_overlap: 0.5 }
    }
}

impl RelationConfig {
    /// Creates a relation configuration.
    pub fn new(min_overlap: f64) -> Self {
        Self { min_overlap }
    }

    /// Returns the minimum overlap ratio.
    pub fn min_overlap(&self) -> f64 {
        self.min_overlap
    }

    fn validate(&self) -> Result<(), SigError> {
        if !(self.min_overlap > 0.0 && self.min_overlap <= 1.0) {
            return Err(SigError::Config(format!(
                "relations.min_overlap must be in (0, 1], got {}",
                self.min_overlap
            )));
        }
        Ok(())
    }
}

/// Bracket connector configuration.
///
/// Distances are expressed in interlines.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectorConfig {
    /// Maximum horizontal offset between the two brackets.
    max_dx: f64,

    /// Maximum vertical gap between the two brackets.
    max_gap: f64,

    /// Minimum grade for a connector to become an interpretation.
    min_grade: f64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            max_dx: 1.0,
            max_gap: 8.0,
            min_grade: 0.5,
        }
    }
}

impl ConnectorConfig {
    /// Creates a connector configuration.
    pub fn new(max_dx: f64, max_gap: f64, min_grade: f64) -> Self {
        Self {
            max_dx,
            max_gap,
            min_grade,
        }
    }

    /// Returns the maximum horizontal offset, in interlines.
    pub fn max_dx(&self) -> f64 {
        self.max_dx
    }

    /// Returns the maximum vertical gap, in interlines.
    pub fn max_gap(&self) -> f64 {
        self.max_gap
    }

    /// Returns the minimum connector grade.
    pub fn min_grade(&self) -> f64 {
        self.min_grade
    }

    fn validate(&self) -> Result<(), SigError> {
        if !(self.max_dx > 0.0 && self.max_dx.is_finite()) {
            return Err(SigError::Config(format!(
                "connectors.max_dx must be positive, got {}",
                self.max_dx
            )));
        }
        if !(self.max_gap >= 0.0 && self.max_gap.is_finite()) {
            return Err(SigError::Config(format!(
                "connectors.max_gap must be non-negative, got {}",
                self.max_gap
            )));
        }
        if !(0.0..=1.0).contains(&self.min_grade) {
            return Err(SigError::Config(format!(
                "connectors.min_grade must be in [0, 1], got {}",
                self.min_grade
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use omrsig_core::shape::Shape;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.reduction().max_iterations(), 64);
        assert_eq!(config.reduction().support_gain(), 0.5);
        assert_eq!(config.relations().min_overlap(), 0.5);
        assert_eq!(config.patterns().len(), 2);
        assert!(!config.references().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.reduction(), AppConfig::default().reduction());
        assert_eq!(config.registry().unwrap().len(), 2);
    }

    #[test]
    fn test_patterns_from_toml() {
        let content = r#"
            [[patterns]]
            name = "alto"
            targets = ["c_clef"]
            max_doubt = 0.4
            first = { shapes = ["dot"], pitch = -1.0 }
            second = { shapes = ["dot"], pitch = 1.0 }
            dx_tolerance = 0.3
            search = { left = 2.0, right = 0.5, down = 2.0 }
        "#;
        let config = AppConfig::from_toml_str(content).unwrap();
        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 1);

        let alto = registry.get("alto").unwrap();
        assert!(alto.targets().contains(Shape::CClef));
        assert_eq!(alto.max_doubt().value(), 0.4);
        assert_eq!(alto.dx_tolerance().get(), 0.3);
        assert_eq!(alto.pitch_tolerance(), 0.5);
        assert!(alto.same_staff());
    }

    #[test]
    fn test_negative_fraction_is_rejected() {
        let content = r#"
            [[patterns]]
            name = "broken"
            targets = ["f_clef"]
            first = { shapes = ["dot"], pitch = -3.0 }
            second = { shapes = ["dot"], pitch = -1.0 }
            dx_tolerance = -0.25
        "#;
        assert!(matches!(
            AppConfig::from_toml_str(content),
            Err(SigError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(AppConfig::from_toml_str("[reduction]\nmax_iteration = 3\n").is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(AppConfig::from_toml_str("[reduction]\nmax_iterations = 0\n").is_err());
        assert!(AppConfig::from_toml_str("[relations]\nmin_overlap = 0.0\n").is_err());
        assert!(AppConfig::from_toml_str("[connectors]\nmin_grade = 1.5\n").is_err());
    }

    #[test]
    fn test_references_from_toml() {
        let content = r#"
            [[references]]
            shape = "dot"
            width = 0.5
            height = 0.5
        "#;
        let config = AppConfig::from_toml_str(content).unwrap();
        assert_eq!(config.references().len(), 1);
        assert_eq!(config.evaluator().references()[0].shape(), Shape::Dot);
    }
}
