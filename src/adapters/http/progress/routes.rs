//! Axum router configuration for progress endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_progress, rebuild_progress, reconcile_all, record_completion, reset_progress,
    ProgressAppState,
};

/// Create the progress API router.
///
/// # Routes
///
/// - `GET /:user_id` - Current progress and next milestone
/// - `POST /:user_id/completions` - Record a completed case
/// - `POST /:user_id/reset` - Zero the user's progress (admin)
/// - `POST /:user_id/rebuild` - Rebuild from the completion log (admin)
/// - `POST /reconcile` - Rebuild every user (admin)
pub fn progress_routes() -> Router<ProgressAppState> {
    Router::new()
        .route("/reconcile", post(reconcile_all))
        .route("/:user_id", get(get_progress))
        .route("/:user_id/completions", post(record_completion))
        .route("/:user_id/reset", post(reset_progress))
        .route("/:user_id/rebuild", post(rebuild_progress))
}

/// Create the progress module router, suitable for mounting at `/api`.
pub fn progress_router() -> Router<ProgressAppState> {
    Router::new().nest("/progress", progress_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::catalog::InMemoryCaseCatalog;
    use crate::adapters::storage::InMemoryProgressStore;
    use crate::application::{ProgressAggregator, ProgressReconciler};
    use crate::config::ProgressConfig;

    fn test_state() -> ProgressAppState {
        let store = Arc::new(InMemoryProgressStore::new());
        let aggregator = Arc::new(ProgressAggregator::new(
            Arc::new(InMemoryCaseCatalog::new()),
            store.clone(),
            ProgressConfig::default(),
        ));
        ProgressAppState {
            reconciler: Arc::new(ProgressReconciler::new(aggregator.clone(), store, 1)),
            aggregator,
        }
    }

    #[test]
    fn progress_routes_builds_with_state() {
        let _: Router<()> = progress_routes().with_state(test_state());
    }

    #[test]
    fn progress_router_builds_with_state() {
        let _: Router<()> = progress_router().with_state(test_state());
    }
}
