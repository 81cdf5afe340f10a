//! Progress domain - per-user case completion statistics.
//!
//! A [`ProgressRecord`] is updated once per completed case. Tier and overall
//! averages are kept as exact score totals, and the [`ProgressionLevel`] is
//! derived from tier thresholds on every write.

mod completion;
mod consistency;
mod difficulty;
mod errors;
mod level;
mod record;

pub use completion::CaseCompletion;
pub use consistency::ConsistencyIssue;
pub use difficulty::DifficultyTier;
pub use errors::ProgressError;
pub use level::{LevelThreshold, Milestone, ProgressionLevel, LEVEL_THRESHOLDS};
pub use record::{ProgressRecord, ProgressRecordParts, TierBreakdown, TierStats};
