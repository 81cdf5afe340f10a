//! Request/response DTOs for progress endpoints.

use serde::{Deserialize, Serialize};

use crate::application::RebuildOutcome;
use crate::domain::foundation::{CompletionId, Timestamp};
use crate::domain::progress::{
    DifficultyTier, Milestone, ProgressRecord, ProgressionLevel, TierStats,
};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/progress/:user_id/completions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCompletionRequest {
    pub case_id: String,
    /// `null` is accepted here and rejected by validation with a 400.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub completion_id: Option<CompletionId>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStatsResponse {
    pub cases_completed: u32,
    pub average_score: f64,
}

impl From<&TierStats> for TierStatsResponse {
    fn from(stats: &TierStats) -> Self {
        Self {
            cases_completed: stats.cases_completed(),
            average_score: stats.average_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiersResponse {
    pub beginner: TierStatsResponse,
    pub intermediate: TierStatsResponse,
    pub advanced: TierStatsResponse,
}

/// Progress read model returned by every progress endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub user_id: String,
    pub tiers: TiersResponse,
    pub total_cases_completed: u32,
    pub overall_average_score: f64,
    pub current_progression_level: ProgressionLevel,
    pub last_updated_at: Timestamp,
    /// `None` once the user is at the top level.
    pub next_milestone: Option<Milestone>,
}

impl From<&ProgressRecord> for ProgressResponse {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            user_id: record.user_id().to_string(),
            tiers: TiersResponse {
                beginner: record.tier(DifficultyTier::Beginner).into(),
                intermediate: record.tier(DifficultyTier::Intermediate).into(),
                advanced: record.tier(DifficultyTier::Advanced).into(),
            },
            total_cases_completed: record.total_cases_completed(),
            overall_average_score: record.overall_average_score(),
            current_progression_level: record.current_progression_level(),
            last_updated_at: *record.last_updated_at(),
            next_milestone: Milestone::next_for(record.current_progression_level(), record.tiers()),
        }
    }
}

/// Result of a rebuild request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildResponse {
    pub progress: ProgressResponse,
    pub drift_detected: bool,
    pub issues: Vec<String>,
}

impl From<&RebuildOutcome> for RebuildResponse {
    fn from(outcome: &RebuildOutcome) -> Self {
        Self {
            progress: ProgressResponse::from(&outcome.record),
            drift_detected: outcome.drift_detected,
            issues: outcome.issues.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
