//! HTTP handlers for progress endpoints.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{ProgressAggregator, ProgressReconciler, RecordCompletionCommand};
use crate::domain::progress::ProgressError;

use super::dto::{
    ErrorResponse, HealthResponse, ProgressResponse, RebuildResponse, RecordCompletionRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for progress handlers.
#[derive(Clone)]
pub struct ProgressAppState {
    pub aggregator: Arc<ProgressAggregator>,
    pub reconciler: Arc<ProgressReconciler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/progress/:user_id - Current progress with next milestone
pub async fn get_progress(
    State(state): State<ProgressAppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ProgressApiError> {
    let record = state.aggregator.get_summary(&user_id).await?;
    Ok(Json(ProgressResponse::from(&record)))
}

/// POST /api/progress/:user_id/completions - Record a completed case
pub async fn record_completion(
    State(state): State<ProgressAppState>,
    Path(user_id): Path<String>,
    Json(request): Json<RecordCompletionRequest>,
) -> Result<impl IntoResponse, ProgressApiError> {
    let cmd = RecordCompletionCommand {
        user_id,
        case_id: request.case_id,
        score: request.score,
        completion_id: request.completion_id,
    };

    let record = state.aggregator.record_completion(cmd).await?;
    Ok(Json(ProgressResponse::from(&record)))
}

/// POST /api/progress/:user_id/reset - Zero a user's progress (admin)
pub async fn reset_progress(
    State(state): State<ProgressAppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ProgressApiError> {
    let record = state.aggregator.reset_progress(&user_id).await?;
    Ok(Json(ProgressResponse::from(&record)))
}

/// POST /api/progress/:user_id/rebuild - Replay the completion log (admin)
pub async fn rebuild_progress(
    State(state): State<ProgressAppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ProgressApiError> {
    let outcome = state.aggregator.rebuild_progress(&user_id).await?;
    Ok(Json(RebuildResponse::from(&outcome)))
}

/// POST /api/progress/reconcile - Rebuild every user (admin)
pub async fn reconcile_all(
    State(state): State<ProgressAppState>,
) -> Result<impl IntoResponse, ProgressApiError> {
    let report = state.reconciler.reconcile_all().await?;
    Ok(Json(report))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts progress errors to HTTP responses.
#[derive(Debug)]
pub struct ProgressApiError(ProgressError);

impl From<ProgressError> for ProgressApiError {
    fn from(err: ProgressError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ProgressApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            ProgressError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            ProgressError::NotFound { .. } => StatusCode::NOT_FOUND,
            ProgressError::ConcurrencyConflict { .. } => StatusCode::CONFLICT,
            ProgressError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self.0 {
            ProgressError::StorageFailure(detail) => {
                tracing::error!(error = %detail, "Progress storage failure");
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(self.0.code().to_string(), message);
        (status, Json(body)).into_response()
    }
}
