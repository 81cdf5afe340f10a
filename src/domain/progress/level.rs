//! Progression level derivation.
//!
//! The level is a pure function of the per-tier counters and averages. It is
//! recomputed in full on every write; no transition history is kept.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DifficultyTier, TierBreakdown};

/// Four-state classification shown to users.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProgressionLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// Requirement for reaching a level: enough cases in one tier with an
/// average strictly above the bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelThreshold {
    pub level: ProgressionLevel,
    pub tier: DifficultyTier,
    pub min_cases: u32,
    pub average_above: f64,
}

impl LevelThreshold {
    fn is_met(&self, tiers: &TierBreakdown) -> bool {
        let stats = tiers.get(self.tier);
        stats.cases_completed() >= self.min_cases && stats.average_score() > self.average_above
    }
}

/// Thresholds in precedence order (first match wins).
pub const LEVEL_THRESHOLDS: [LevelThreshold; 3] = [
    LevelThreshold {
        level: ProgressionLevel::Expert,
        tier: DifficultyTier::Advanced,
        min_cases: 10,
        average_above: 80.0,
    },
    LevelThreshold {
        level: ProgressionLevel::Advanced,
        tier: DifficultyTier::Intermediate,
        min_cases: 15,
        average_above: 75.0,
    },
    LevelThreshold {
        level: ProgressionLevel::Intermediate,
        tier: DifficultyTier::Beginner,
        min_cases: 10,
        average_above: 70.0,
    },
];

impl ProgressionLevel {
    /// Derives the level from tier statistics.
    pub fn evaluate(tiers: &TierBreakdown) -> Self {
        LEVEL_THRESHOLDS
            .iter()
            .find(|threshold| threshold.is_met(tiers))
            .map(|threshold| threshold.level)
            .unwrap_or(ProgressionLevel::Beginner)
    }

    /// The level above this one, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            ProgressionLevel::Beginner => Some(ProgressionLevel::Intermediate),
            ProgressionLevel::Intermediate => Some(ProgressionLevel::Advanced),
            ProgressionLevel::Advanced => Some(ProgressionLevel::Expert),
            ProgressionLevel::Expert => None,
        }
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressionLevel::Beginner => "beginner",
            ProgressionLevel::Intermediate => "intermediate",
            ProgressionLevel::Advanced => "advanced",
            ProgressionLevel::Expert => "expert",
        }
    }

    /// Parses the storage representation produced by [`as_str`](Self::as_str).
    pub fn from_storage(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(ProgressionLevel::Beginner),
            "intermediate" => Some(ProgressionLevel::Intermediate),
            "advanced" => Some(ProgressionLevel::Advanced),
            "expert" => Some(ProgressionLevel::Expert),
            _ => None,
        }
    }

    /// Returns the display name for this level.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProgressionLevel::Beginner => "Beginner",
            ProgressionLevel::Intermediate => "Intermediate",
            ProgressionLevel::Advanced => "Advanced",
            ProgressionLevel::Expert => "Expert",
        }
    }
}

impl fmt::Display for ProgressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What a user still needs for the next level, for dashboard display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub target_level: ProgressionLevel,
    pub tier: DifficultyTier,
    pub cases_remaining: u32,
    pub current_average: f64,
    pub average_to_exceed: f64,
}

impl Milestone {
    /// Next milestone above `current`, or `None` at the top level.
    pub fn next_for(current: ProgressionLevel, tiers: &TierBreakdown) -> Option<Self> {
        let target = current.next()?;
        let threshold = LEVEL_THRESHOLDS.iter().find(|t| t.level == target)?;
        let stats = tiers.get(threshold.tier);

        Some(Self {
            target_level: target,
            tier: threshold.tier,
            cases_remaining: threshold.min_cases.saturating_sub(stats.cases_completed()),
            current_average: stats.average_score(),
            average_to_exceed: threshold.average_above,
        })
    }

    /// True when the average requirement is already met.
    pub fn average_met(&self) -> bool {
        self.current_average > self.average_to_exceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SCORE_UNITS_PER_POINT;
    use crate::domain::progress::TierStats;

    fn stats((count, average): (u32, f64)) -> TierStats {
        let total = (f64::from(count) * average * SCORE_UNITS_PER_POINT as f64).round() as i64;
        TierStats::from_parts(count, total)
    }

    fn tiers(beginner: (u32, f64), intermediate: (u32, f64), advanced: (u32, f64)) -> TierBreakdown {
        TierBreakdown {
            beginner: stats(beginner),
            intermediate: stats(intermediate),
            advanced: stats(advanced),
        }
    }

    #[test]
    fn empty_record_is_beginner() {
        assert_eq!(
            ProgressionLevel::evaluate(&TierBreakdown::default()),
            ProgressionLevel::Beginner
        );
    }

    #[test]
    fn beginner_threshold_is_strict() {
        let at_bar = tiers((10, 70.0), (0, 0.0), (0, 0.0));
        assert_eq!(ProgressionLevel::evaluate(&at_bar), ProgressionLevel::Beginner);

        let above_bar = tiers((10, 70.01), (0, 0.0), (0, 0.0));
        assert_eq!(
            ProgressionLevel::evaluate(&above_bar),
            ProgressionLevel::Intermediate
        );
    }

    #[test]
    fn intermediate_threshold_is_strict() {
        let at_bar = tiers((0, 0.0), (15, 75.0), (0, 0.0));
        assert_eq!(ProgressionLevel::evaluate(&at_bar), ProgressionLevel::Beginner);

        let above_bar = tiers((0, 0.0), (15, 75.01), (0, 0.0));
        assert_eq!(ProgressionLevel::evaluate(&above_bar), ProgressionLevel::Advanced);
    }

    #[test]
    fn advanced_threshold_is_strict() {
        let at_bar = tiers((0, 0.0), (0, 0.0), (10, 80.0));
        assert_eq!(ProgressionLevel::evaluate(&at_bar), ProgressionLevel::Beginner);

        let above_bar = tiers((0, 0.0), (0, 0.0), (10, 80.01));
        assert_eq!(ProgressionLevel::evaluate(&above_bar), ProgressionLevel::Expert);
    }

    #[test]
    fn count_threshold_must_also_be_met() {
        let too_few = tiers((9, 99.0), (14, 99.0), (9, 99.0));
        assert_eq!(ProgressionLevel::evaluate(&too_few), ProgressionLevel::Beginner);
    }

    #[test]
    fn expert_takes_precedence_over_lower_levels() {
        let all_met = tiers((10, 90.0), (15, 90.0), (10, 90.0));
        assert_eq!(ProgressionLevel::evaluate(&all_met), ProgressionLevel::Expert);
    }

    #[test]
    fn levels_order_ascending() {
        assert!(ProgressionLevel::Beginner < ProgressionLevel::Intermediate);
        assert!(ProgressionLevel::Advanced < ProgressionLevel::Expert);
    }

    #[test]
    fn storage_representation_roundtrips() {
        for level in [
            ProgressionLevel::Beginner,
            ProgressionLevel::Intermediate,
            ProgressionLevel::Advanced,
            ProgressionLevel::Expert,
        ] {
            assert_eq!(ProgressionLevel::from_storage(level.as_str()), Some(level));
        }
    }

    #[test]
    fn milestone_for_beginner_targets_beginner_tier() {
        let t = tiers((4, 65.0), (0, 0.0), (0, 0.0));
        let milestone = Milestone::next_for(ProgressionLevel::Beginner, &t).unwrap();

        assert_eq!(milestone.target_level, ProgressionLevel::Intermediate);
        assert_eq!(milestone.tier, DifficultyTier::Beginner);
        assert_eq!(milestone.cases_remaining, 6);
        assert_eq!(milestone.average_to_exceed, 70.0);
        assert!(!milestone.average_met());
    }

    #[test]
    fn milestone_cases_remaining_saturates() {
        let t = tiers((0, 0.0), (20, 60.0), (0, 0.0));
        let milestone = Milestone::next_for(ProgressionLevel::Intermediate, &t).unwrap();

        assert_eq!(milestone.tier, DifficultyTier::Intermediate);
        assert_eq!(milestone.cases_remaining, 0);
    }

    #[test]
    fn no_milestone_above_expert() {
        assert!(Milestone::next_for(ProgressionLevel::Expert, &TierBreakdown::default()).is_none());
    }
}
