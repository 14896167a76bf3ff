//! omrsig - Glyph compounding and interpretation-graph reduction for optical
//! music recognition.
//!
//! Symbols printed in several pieces are recovered by template-driven pattern
//! matching over segmented glyphs, and every candidate interpretation of a
//! page region is arbitrated in a symbol interpretation graph until a
//! consistent set of survivors remains.
//!
//! The crate is organized by stage:
//!
//! - [`sheet`] reads page descriptions into regions of staves and glyphs.
//! - [`pattern`] and [`compound`] match templates and build compounds.
//! - [`evaluator`] is the shape classification seam.
//! - [`sig`] holds the interpretation graph and its reduction.
//! - [`pipeline`] runs the stages over regions and pages.
//! - [`report`] summarizes the survivors.

pub mod compound;
pub mod config;
pub mod evaluator;
pub mod glyph;
pub mod pattern;
pub mod pipeline;
pub mod region;
pub mod report;
pub mod sheet;
pub mod sig;

mod error;

pub use omrsig_core::{geometry, grade, identifier, scale, shape};

pub use error::SigError;

use log::{debug, info};

use config::AppConfig;
use evaluator::ShapeEvaluator;
use pipeline::{PageProcessor, PageResult};
use report::PageReport;
use sheet::Sheet;

/// Entry point for interpreting pages.
///
/// Ties the configuration to the pipeline: templates and reference shapes
/// come from [`AppConfig`], and pages are processed region by region.
///
/// # Examples
///
/// ```rust
/// use omrsig::{PageInterpreter, config::AppConfig};
///
/// let source = "interline = 20\n";
/// let interpreter = PageInterpreter::new(AppConfig::default());
///
/// let sheet = interpreter.parse(source).expect("Failed to parse");
/// let result = interpreter.process(&sheet).expect("Failed to process");
/// let report = interpreter.report(&sheet, &result);
///
/// assert!(report.to_toml().is_ok());
/// ```
#[derive(Default)]
pub struct PageInterpreter {
    config: AppConfig,
}

impl PageInterpreter {
    /// Create a new interpreter with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including templates and references
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a page description.
    ///
    /// # Errors
    ///
    /// Returns `SigError::Input` for malformed or invalid descriptions.
    pub fn parse(&self, source: &str) -> Result<Sheet, SigError> {
        info!("Parsing page description");
        let sheet = Sheet::from_toml_str(source)?;
        debug!(regions = sheet.regions().len(); "Page description parsed");
        Ok(sheet)
    }

    /// Process a page with the configured reference evaluator.
    ///
    /// # Errors
    ///
    /// Returns `SigError::Config` for invalid templates, and propagates
    /// region processing errors.
    pub fn process(&self, sheet: &Sheet) -> Result<PageResult, SigError> {
        let evaluator = self.config.evaluator();
        self.process_with(sheet, &evaluator)
    }

    /// Process a page with a caller-provided shape evaluator.
    ///
    /// # Errors
    ///
    /// Returns `SigError::Config` for invalid templates, and propagates
    /// region processing errors.
    pub fn process_with(
        &self,
        sheet: &Sheet,
        evaluator: &dyn ShapeEvaluator,
    ) -> Result<PageResult, SigError> {
        let registry = self.config.registry()?;
        info!(
            templates = registry.len(),
            regions = sheet.regions().len();
            "Processing page"
        );
        PageProcessor::new(&registry, evaluator, &self.config).process(sheet)
    }

    /// Summarize a processed page.
    pub fn report(&self, sheet: &Sheet, result: &PageResult) -> PageReport {
        PageReport::new(result, sheet.scale())
    }
}
