//! Completion log entry.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CaseId, CompletionId, Score, Timestamp, UserId};

use super::DifficultyTier;

/// One applied case completion.
///
/// The tier is captured at completion time so a later relabel of the case
/// does not change how history replays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCompletion {
    id: CompletionId,
    user_id: UserId,
    case_id: CaseId,
    tier: DifficultyTier,
    score: Score,
    completed_at: Timestamp,
}

impl CaseCompletion {
    pub fn new(
        id: CompletionId,
        user_id: UserId,
        case_id: CaseId,
        tier: DifficultyTier,
        score: Score,
        completed_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            case_id,
            tier,
            score,
            completed_at,
        }
    }

    pub fn id(&self) -> CompletionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn case_id(&self) -> &CaseId {
        &self.case_id
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn completed_at(&self) -> &Timestamp {
        &self.completed_at
    }
}
