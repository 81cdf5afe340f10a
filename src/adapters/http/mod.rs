//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure;
//! [`app_router`] assembles them with the shared middleware stack.

pub mod progress;

use std::time::Duration;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use progress::{progress_router, ProgressAppState};

/// Build the complete application router.
///
/// # Routes
/// - `GET /health` - Liveness probe
/// - `/api/progress/...` - See [`progress::progress_routes`]
pub fn app_router(state: ProgressAppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(progress::health))
        .nest("/api", progress_router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CompressionLayer::new()),
        )
}
