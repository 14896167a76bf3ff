//! Validation errors for core value types.

use thiserror::Error;

/// A value rejected at construction because it violates a type invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("distance must be a finite, non-negative interline fraction, got {0}")]
    InvalidDistance(f64),

    #[error("interline must be a positive number of pixels")]
    ZeroInterline,

    #[error("grade must lie in (0, 1], got {0}")]
    GradeOutOfRange(f64),

    #[error("doubt must lie in [0, 1], got {0}")]
    DoubtOutOfRange(f64),
}
