//! Error types for omrsig operations.
//!
//! This module provides the main error type [`SigError`]. Expected outcomes
//! such as a template mismatch or a candidate rejected for low confidence
//! are not errors: they surface as `None` or as lower success counts.
//! Arbitration deadlocks are not errors either; they are reported inside
//! [`crate::sig::ReductionReport`] next to the reduction result.

use std::{io, ops::Range};

use thiserror::Error;

use omrsig_core::{ValueError, identifier::GlyphId};

/// The main error type for omrsig operations.
#[derive(Debug, Error)]
pub enum SigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A page description could not be read.
    ///
    /// Carries the byte span of the offending input, when known, together
    /// with the source text so callers can render a labelled snippet.
    #[error("Invalid page description: {message}")]
    Input {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value: {0}")]
    Value(#[from] ValueError),

    /// A glyph reference does not belong to the pool it is used with.
    #[error("Glyph {id} is not part of the glyph pool")]
    UnknownGlyph { id: GlyphId },

    /// Two glyphs of one pool share an identifier.
    #[error("Duplicate glyph identifier {id}")]
    DuplicateGlyph { id: GlyphId },

    /// An interpretation handle does not belong to the graph.
    #[error("Interpretation {id} is not part of the graph")]
    UnknownInter { id: usize },

    #[error("Report error: {0}")]
    Report(String),
}

impl SigError {
    /// Create a new `Input` error with the associated source text.
    pub fn new_input_error(
        message: impl Into<String>,
        span: Option<Range<usize>>,
        src: impl Into<String>,
    ) -> Self {
        Self::Input {
            message: message.into(),
            span,
            src: src.into(),
        }
    }
}
