//! Error adapter for converting SigError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI. Input errors
//! carry their page description, so they render with a labelled snippet.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use omrsig::SigError;

/// Adapter rendering a [`SigError`] through miette.
pub struct ErrorAdapter<'a>(pub &'a SigError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            SigError::Io(_) => "omrsig::io",
            SigError::Input { .. } => "omrsig::input",
            SigError::Config(_) => "omrsig::config",
            SigError::Value(_) => "omrsig::value",
            SigError::UnknownGlyph { .. } => "omrsig::unknown_glyph",
            SigError::DuplicateGlyph { .. } => "omrsig::duplicate_glyph",
            SigError::UnknownInter { .. } => "omrsig::unknown_inter",
            SigError::Report(_) => "omrsig::report",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            SigError::Config(_) => "check the configuration file passed with --config",
            SigError::DuplicateGlyph { .. } => "glyph identifiers must be unique within a region",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match &self.0 {
            SigError::Input { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let SigError::Input {
            message,
            span: Some(span),
            ..
        } = &self.0
        else {
            return None;
        };

        let label = LabeledSpan::new_primary_with_span(
            Some(message.clone()),
            SourceSpan::from(span.clone()),
        );
        Some(Box::new(std::iter::once(label)))
    }
}
