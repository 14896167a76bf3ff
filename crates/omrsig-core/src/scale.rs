//! Page scale: conversion between interline-relative distances and pixels.
//!
//! Every geometric tolerance in omrsig is expressed as a fraction of the
//! interline (the distance between two staff lines) so that the same
//! templates apply to pages scanned at any resolution. [`Scale`] turns those
//! fractions into pixel distances for one page.

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A non-negative distance expressed in interline units.
///
/// Negative or non-finite fractions are rejected at construction, so a
/// [`Scale`] can never be asked to convert one.
///
/// # Examples
///
/// ```
/// use omrsig_core::scale::InterlineFraction;
///
/// assert!(InterlineFraction::new(0.25).is_ok());
/// assert!(InterlineFraction::new(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct InterlineFraction(f64);

impl InterlineFraction {
    /// Zero distance.
    pub const ZERO: Self = Self(0.0);

    /// Creates a fraction, rejecting negative and non-finite values.
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValueError::InvalidDistance(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw value in interline units.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for InterlineFraction {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InterlineFraction> for f64 {
    fn from(fraction: InterlineFraction) -> Self {
        fraction.0
    }
}

/// Scale of one page, defined by its interline in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Scale {
    interline: u32,
}

impl Scale {
    /// Creates a scale from the interline in pixels, which must be positive.
    pub fn new(interline: u32) -> Result<Self, ValueError> {
        if interline == 0 {
            return Err(ValueError::ZeroInterline);
        }
        Ok(Self { interline })
    }

    /// Returns the interline in pixels.
    pub fn interline(self) -> u32 {
        self.interline
    }

    /// Converts an interline fraction to a rounded number of pixels.
    ///
    /// # Examples
    ///
    /// ```
    /// use omrsig_core::scale::{InterlineFraction, Scale};
    ///
    /// let scale = Scale::new(20).unwrap();
    /// let tolerance = InterlineFraction::new(0.25).unwrap();
    /// assert_eq!(scale.to_pixels(tolerance), 5);
    /// ```
    pub fn to_pixels(self, fraction: InterlineFraction) -> i32 {
        (fraction.get() * f64::from(self.interline)).round() as i32
    }

    /// Converts an interline fraction to a pixel distance without rounding.
    ///
    /// # Examples
    ///
    /// ```
    /// use omrsig_core::scale::{InterlineFraction, Scale};
    ///
    /// let scale = Scale::new(18).unwrap();
    /// let tolerance = InterlineFraction::new(0.25).unwrap();
    /// assert_eq!(scale.to_pixels_f32(tolerance), 4.5);
    /// ```
    pub fn to_pixels_f32(self, fraction: InterlineFraction) -> f32 {
        (fraction.get() * f64::from(self.interline)) as f32
    }

    /// Converts a pixel distance into interline units.
    pub fn to_interlines(self, pixels: f32) -> f32 {
        pixels / self.interline as f32
    }
}

impl TryFrom<u32> for Scale {
    type Error = ValueError;

    fn try_from(interline: u32) -> Result<Self, Self::Error> {
        Self::new(interline)
    }
}

impl From<Scale> for u32 {
    fn from(scale: Scale) -> Self {
        scale.interline
    }
}
