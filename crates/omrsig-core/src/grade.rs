//! The grade model.
//!
//! A [`Grade`] is a normalized confidence in `(0, 1]` that a glyph or an
//! interpretation has a given shape. Its complement, the [`Doubt`], is the
//! quantity compared against acceptance thresholds.
//!
//! Raw grades may be built from several named sub-scores ([`GradeImpacts`])
//! combined through a weighted geometric mean, so that a single near-zero
//! impact vetoes the whole candidate instead of being averaged away.
//! During reduction a raw grade is boosted by the support an interpretation
//! receives from its alive partners, see [`Grade::contextual`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Rounding slack allowed when comparing a doubt against its threshold.
pub const ACCEPTANCE_EPSILON: f64 = 1e-9;

/// A confidence value in `(0, 1]`.
///
/// # Examples
///
/// ```
/// use omrsig_core::grade::Grade;
///
/// let grade = Grade::new(0.8).unwrap();
/// assert!((grade.doubt().value() - 0.2).abs() < 1e-9);
///
/// assert!(Grade::new(0.0).is_err());
/// assert!(Grade::new(1.2).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Grade(f64);

impl Grade {
    /// The highest possible grade.
    pub const MAX: Self = Self(1.0);

    /// Creates a grade, rejecting values outside `(0, 1]`.
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if value.is_nan() || value <= 0.0 || value > 1.0 {
            return Err(ValueError::GradeOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Clips a value into `(0, 1]`.
    ///
    /// Values above 1 are clipped to 1; zero, negative and NaN values have no
    /// grade and yield `None`.
    pub fn clipped(value: f64) -> Option<Self> {
        if value.is_nan() || value <= 0.0 {
            None
        } else {
            Some(Self(value.min(1.0)))
        }
    }

    /// Returns the raw value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns the doubt `1 - grade`.
    pub fn doubt(self) -> Doubt {
        Doubt(1.0 - self.0)
    }

    /// Returns true if the doubt of this grade does not exceed `max_doubt`.
    ///
    /// A doubt within [`ACCEPTANCE_EPSILON`] of the threshold is accepted,
    /// so a grade of `0.7` passes a maximum doubt of `0.3`.
    pub fn is_acceptable(self, max_doubt: Doubt) -> bool {
        self.doubt().0 <= max_doubt.0 + ACCEPTANCE_EPSILON
    }

    /// Boosts this raw grade with the total strength of incoming support.
    ///
    /// The boost saturates: `raw + (1 - raw) * (1 - exp(-gain * support))`.
    /// Without support, or with a null gain, the raw grade is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use omrsig_core::grade::Grade;
    ///
    /// let raw = Grade::new(0.5).unwrap();
    /// assert_eq!(raw.contextual(0.0, 1.0), raw);
    ///
    /// let boosted = raw.contextual(2.0, 1.0);
    /// assert!(boosted > raw);
    /// assert!(boosted.value() <= 1.0);
    /// ```
    pub fn contextual(self, support: f64, gain: f64) -> Self {
        let total = (support * gain).max(0.0);
        if total == 0.0 || total.is_nan() {
            return self;
        }
        let boost = 1.0 - (-total).exp();
        Self((self.0 + (1.0 - self.0) * boost).clamp(self.0, 1.0))
    }

    /// Total order over grades, for sorting.
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for Grade {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for f64 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Debug for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade({:.3})", self.0)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// The complement of a grade, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Doubt(f64);

impl Doubt {
    /// Creates a doubt, rejecting values outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValueError::DoubtOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Clamps a value into `[0, 1]`; NaN is treated as full doubt.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Self(1.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Returns the raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Doubt {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Doubt> for f64 {
    fn from(doubt: Doubt) -> Self {
        doubt.0
    }
}

/// One named sub-score contributing to a grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Impact {
    name: String,
    value: f64,
    weight: f64,
}

impl Impact {
    /// Returns the impact name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the impact value in `[0, 1]`.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the relative weight of the impact.
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A set of weighted impacts combined by weighted geometric mean.
///
/// # Examples
///
/// ```
/// use omrsig_core::grade::GradeImpacts;
///
/// let impacts = GradeImpacts::new()
///     .with("alignment", 0.9, 2.0)
///     .with("width", 0.0, 1.0);
///
/// // A single null impact vetoes the candidate
/// assert_eq!(impacts.combined(), 0.0);
/// assert!(impacts.grade().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GradeImpacts {
    impacts: Vec<Impact>,
}

impl GradeImpacts {
    /// Creates an empty set of impacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an impact. Values are clamped to `[0, 1]`, weights to `>= 0`.
    pub fn with(mut self, name: impl Into<String>, value: f64, weight: f64) -> Self {
        self.impacts.push(Impact {
            name: name.into(),
            value: if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) },
            weight: if weight.is_nan() { 0.0 } else { weight.max(0.0) },
        });
        self
    }

    /// Iterates over the impacts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Impact> {
        self.impacts.iter()
    }

    /// Returns the impact with the given name.
    pub fn get(&self, name: &str) -> Option<&Impact> {
        self.impacts.iter().find(|impact| impact.name == name)
    }

    /// Weighted geometric mean of the impact values, in `[0, 1]`.
    ///
    /// Impacts with a null weight are ignored. An empty (or fully
    /// zero-weighted) set combines to 0.
    pub fn combined(&self) -> f64 {
        let total_weight: f64 = self.impacts.iter().map(|impact| impact.weight).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }

        let mut log_sum = 0.0;
        for impact in self.impacts.iter().filter(|impact| impact.weight > 0.0) {
            if impact.value <= 0.0 {
                return 0.0;
            }
            log_sum += impact.weight * impact.value.ln();
        }
        (log_sum / total_weight).exp().clamp(0.0, 1.0)
    }

    /// Combined grade, or `None` when an impact vetoes the candidate.
    pub fn grade(&self) -> Option<Grade> {
        Grade::clipped(self.combined())
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn grade_strategy() -> impl Strategy<Value = Grade> {
        (0.001f64..=1.0).prop_map(|value| Grade::new(value).unwrap())
    }

    /// The contextual grade never leaves (0, 1] and never drops below raw.
    fn check_contextual_stays_in_range(
        raw: Grade,
        support: f64,
        gain: f64,
    ) -> Result<(), TestCaseError> {
        let boosted = raw.contextual(support, gain);
        prop_assert!(boosted.value() > 0.0);
        prop_assert!(boosted.value() <= 1.0);
        prop_assert!(boosted >= raw);
        Ok(())
    }

    /// The geometric mean lies between the smallest and largest impact.
    fn check_mean_between_extremes(values: Vec<(f64, f64)>) -> Result<(), TestCaseError> {
        let impacts = values
            .iter()
            .enumerate()
            .fold(GradeImpacts::new(), |acc, (idx, (value, weight))| {
                acc.with(format!("i{idx}"), *value, *weight)
            });
        let min = values.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
        let max = values.iter().map(|(v, _)| *v).fold(0.0, f64::max);
        let combined = impacts.combined();
        prop_assert!(combined >= min - 1e-9);
        prop_assert!(combined <= max + 1e-9);
        Ok(())
    }

    proptest! {
        #[test]
        fn contextual_stays_in_range(
            raw in grade_strategy(),
            support in 0.0f64..20.0,
            gain in 0.0f64..5.0,
        ) {
            check_contextual_stays_in_range(raw, support, gain)?;
        }

        #[test]
        fn mean_between_extremes(
            values in prop::collection::vec((0.01f64..=1.0, 0.1f64..5.0), 1..6),
        ) {
            check_mean_between_extremes(values)?;
        }
    }
}
