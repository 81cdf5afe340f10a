//! ProgressRecord aggregate - one per user.
//!
//! Holds per-tier and overall running statistics plus the derived
//! progression level. Averages are derived from exact score totals so the
//! overall average always equals the mean of every recorded score,
//! independent of the order scores arrived in.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{rounded_mean, Score, Timestamp, UserId};

use super::{CaseCompletion, ConsistencyIssue, DifficultyTier, ProgressionLevel};

/// Running statistics for one bucket of completions.
///
/// `score_units` is the exact sum of scores in fixed-point units; the
/// average is derived from it and never accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStats {
    cases_completed: u32,
    score_units: i64,
    average_score: f64,
}

impl TierStats {
    /// Rebuilds stats from a count and the exact sum of scores.
    pub fn from_parts(cases_completed: u32, score_units: i64) -> Self {
        Self {
            cases_completed,
            score_units,
            average_score: rounded_mean(score_units, cases_completed),
        }
    }

    /// Folds one score into the running mean.
    pub fn record(&mut self, score: Score) {
        *self = Self::from_parts(self.cases_completed + 1, self.score_units + score.units());
    }

    pub fn cases_completed(&self) -> u32 {
        self.cases_completed
    }

    pub fn score_units(&self) -> i64 {
        self.score_units
    }

    pub fn average_score(&self) -> f64 {
        self.average_score
    }
}

/// Statistics for each difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBreakdown {
    pub beginner: TierStats,
    pub intermediate: TierStats,
    pub advanced: TierStats,
}

impl TierBreakdown {
    pub fn get(&self, tier: DifficultyTier) -> &TierStats {
        match tier {
            DifficultyTier::Beginner => &self.beginner,
            DifficultyTier::Intermediate => &self.intermediate,
            DifficultyTier::Advanced => &self.advanced,
        }
    }

    fn get_mut(&mut self, tier: DifficultyTier) -> &mut TierStats {
        match tier {
            DifficultyTier::Beginner => &mut self.beginner,
            DifficultyTier::Intermediate => &mut self.intermediate,
            DifficultyTier::Advanced => &mut self.advanced,
        }
    }

    /// Sum of completions across all tiers.
    pub fn cases_completed(&self) -> u32 {
        DifficultyTier::ALL
            .iter()
            .map(|tier| self.get(*tier).cases_completed())
            .sum()
    }
}

/// Raw fields for reconstituting a record from storage.
#[derive(Debug, Clone)]
pub struct ProgressRecordParts {
    pub user_id: UserId,
    pub tiers: TierBreakdown,
    pub overall: TierStats,
    pub level: ProgressionLevel,
    pub last_updated_at: Timestamp,
    pub version: u64,
}

/// Per-user progress aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    user_id: UserId,
    tiers: TierBreakdown,
    overall: TierStats,
    current_progression_level: ProgressionLevel,
    last_updated_at: Timestamp,
    version: u64,
}

impl ProgressRecord {
    /// Creates a zeroed record that has never been persisted (version 0).
    ///
    /// Stamped with the Unix epoch so repeated reads of an unknown user
    /// return identical records.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            tiers: TierBreakdown::default(),
            overall: TierStats::default(),
            current_progression_level: ProgressionLevel::Beginner,
            last_updated_at: Timestamp::UNIX_EPOCH,
            version: 0,
        }
    }

    /// Reconstitutes a record from persisted fields without recomputation.
    pub fn from_parts(parts: ProgressRecordParts) -> Self {
        Self {
            user_id: parts.user_id,
            tiers: parts.tiers,
            overall: parts.overall,
            current_progression_level: parts.level,
            last_updated_at: parts.last_updated_at,
            version: parts.version,
        }
    }

    /// Rebuilds a record by replaying completions in chronological order.
    pub fn replay(user_id: UserId, completions: &[CaseCompletion]) -> Self {
        let mut ordered: Vec<&CaseCompletion> = completions.iter().collect();
        ordered.sort_by_key(|c| *c.completed_at());

        let mut record = Self::new(user_id);
        for completion in ordered {
            record.apply_completion(completion.tier(), completion.score(), *completion.completed_at());
        }
        record
    }

    // Accessors

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn tiers(&self) -> &TierBreakdown {
        &self.tiers
    }

    pub fn tier(&self, tier: DifficultyTier) -> &TierStats {
        self.tiers.get(tier)
    }

    pub fn total_cases_completed(&self) -> u32 {
        self.overall.cases_completed()
    }

    pub fn overall_average_score(&self) -> f64 {
        self.overall.average_score()
    }

    pub fn overall(&self) -> &TierStats {
        &self.overall
    }

    pub fn current_progression_level(&self) -> ProgressionLevel {
        self.current_progression_level
    }

    pub fn last_updated_at(&self) -> &Timestamp {
        &self.last_updated_at
    }

    /// Optimistic concurrency token; 0 for a record never persisted.
    pub fn version(&self) -> u64 {
        self.version
    }

    // Mutations

    /// Applies one completed case: tier stats, overall stats and level.
    pub fn apply_completion(&mut self, tier: DifficultyTier, score: Score, at: Timestamp) {
        self.tiers.get_mut(tier).record(score);
        self.overall.record(score);
        self.current_progression_level = ProgressionLevel::evaluate(&self.tiers);
        self.last_updated_at = at;
    }

    /// Zeroes every counter and drops back to Beginner.
    pub fn reset(&mut self, at: Timestamp) {
        self.tiers = TierBreakdown::default();
        self.overall = TierStats::default();
        self.current_progression_level = ProgressionLevel::Beginner;
        self.last_updated_at = at;
    }

    /// True when the record holds no progress at all.
    pub fn is_reset(&self) -> bool {
        self.tiers == TierBreakdown::default()
            && self.overall == TierStats::default()
            && self.current_progression_level == ProgressionLevel::Beginner
    }

    /// Moves to the next version; called once per committed write.
    pub fn advance_version(&mut self) {
        self.version += 1;
    }

    /// Pins the version, used when a rebuilt record replaces a stored one.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Compares progress content, ignoring timestamp and version.
    pub fn same_progress(&self, other: &ProgressRecord) -> bool {
        self.user_id == other.user_id
            && self.current_progression_level == other.current_progression_level
            && self.overall == other.overall
            && self.tiers == other.tiers
    }

    /// Checks the record's invariants, returning every violation found.
    pub fn verify_consistency(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        let tier_sum = self.tiers.cases_completed();
        if tier_sum != self.overall.cases_completed() {
            issues.push(ConsistencyIssue::TotalMismatch {
                total: self.overall.cases_completed(),
                tier_sum,
            });
        }

        let tier_units_sum: i64 = DifficultyTier::ALL
            .iter()
            .map(|t| self.tiers.get(*t).score_units())
            .sum();
        if tier_units_sum != self.overall.score_units() {
            issues.push(ConsistencyIssue::ScoreTotalMismatch {
                total_units: self.overall.score_units(),
                tier_sum_units: tier_units_sum,
            });
        }

        let averages = DifficultyTier::ALL
            .iter()
            .map(|t| (Some(*t), self.tiers.get(*t).average_score()))
            .chain(std::iter::once((None, self.overall.average_score())));
        for (tier, average) in averages {
            if !(Score::MIN..=Score::MAX).contains(&average) {
                issues.push(ConsistencyIssue::AverageOutOfRange { tier, average });
            }
        }

        let expected = ProgressionLevel::evaluate(&self.tiers);
        if expected != self.current_progression_level {
            issues.push(ConsistencyIssue::StaleLevel {
                stored: self.current_progression_level,
                expected,
            });
        }

        issues
    }
}
