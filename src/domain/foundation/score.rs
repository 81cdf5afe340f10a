//! Score value object (0-100 scale, fractional) and fixed-point score sums.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Resolution of stored score sums: one millionth of a point.
///
/// Sums are kept as integers in these units so they are exact and
/// independent of the order scores were added in.
pub const SCORE_UNITS_PER_POINT: i64 = 1_000_000;

/// A case score between 0 and 100 inclusive.
///
/// Always finite. NaN, infinities and missing values are rejected at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    /// Creates a Score, returning error if not finite or out of range.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::invalid_format(
                "score",
                "invalid score: must be a finite number",
            ));
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::out_of_range(
                "score",
                Self::MIN,
                Self::MAX,
                value,
            ));
        }
        Ok(Self(value))
    }

    /// Creates a Score from a value that may be missing.
    pub fn try_from_option(value: Option<f64>) -> Result<Self, ValidationError> {
        match value {
            Some(v) => Self::try_new(v),
            None => Err(ValidationError::invalid_format(
                "score",
                "invalid score: value is missing",
            )),
        }
    }

    /// Returns the value as f64.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// The score in fixed-point units, see [`SCORE_UNITS_PER_POINT`].
    pub fn units(&self) -> i64 {
        (self.0 * SCORE_UNITS_PER_POINT as f64).round() as i64
    }
}

impl TryFrom<f64> for Score {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mean of `count` scores whose exact sum is `total_units`, rounded half-up
/// to two decimal places. Zero when there are no scores.
pub fn rounded_mean(total_units: i64, count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let divisor = i128::from(count) * i128::from(SCORE_UNITS_PER_POINT / 100);
    let hundredths = (2 * i128::from(total_units) + divisor).div_euclid(2 * divisor);
    hundredths as f64 / 100.0
}
