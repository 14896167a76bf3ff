//! omrsig Core Types and Definitions
//!
//! This crate provides the foundational types shared by the omrsig
//! recognition engine:
//!
//! - **Identifiers**: Numeric glyph, staff and region identifiers ([`identifier`] module)
//! - **Geometry**: Points and bounding boxes in page pixels ([`geometry`] module)
//! - **Shapes**: Symbol shapes and shape families ([`shape`] module)
//! - **Scale**: Interline-relative distances and their pixel conversion ([`scale`] module)
//! - **Grades**: Confidence values, doubts and impact combination ([`grade`] module)

pub mod error;
pub mod geometry;
pub mod grade;
pub mod identifier;
pub mod scale;
pub mod shape;

pub use error::ValueError;
