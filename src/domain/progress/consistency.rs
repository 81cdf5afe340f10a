//! Invariant violations found on a stored progress record.

use serde::Serialize;
use std::fmt;

use super::{DifficultyTier, ProgressionLevel};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyIssue {
    /// Overall case count differs from the sum of tier counts.
    TotalMismatch { total: u32, tier_sum: u32 },

    /// Overall score sum differs from the sum of tier score sums, in score units.
    ScoreTotalMismatch { total_units: i64, tier_sum_units: i64 },

    /// An average lies outside 0..=100. `tier` is `None` for the overall average.
    AverageOutOfRange {
        tier: Option<DifficultyTier>,
        average: f64,
    },

    /// Stored level is not what the thresholds yield for the stored counters.
    StaleLevel {
        stored: ProgressionLevel,
        expected: ProgressionLevel,
    },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyIssue::TotalMismatch { total, tier_sum } => {
                write!(f, "total cases {} != sum of tiers {}", total, tier_sum)
            }
            ConsistencyIssue::ScoreTotalMismatch {
                total_units,
                tier_sum_units,
            } => write!(
                f,
                "score total {} != sum of tier totals {} (units)",
                total_units, tier_sum_units
            ),
            ConsistencyIssue::AverageOutOfRange { tier, average } => match tier {
                Some(tier) => write!(f, "{} average {} out of range", tier, average),
                None => write!(f, "overall average {} out of range", average),
            },
            ConsistencyIssue::StaleLevel { stored, expected } => {
                write!(f, "stored level {} but counters give {}", stored, expected)
            }
        }
    }
}
