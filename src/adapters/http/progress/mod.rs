//! HTTP adapter for progress endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, HealthResponse, ProgressResponse, RebuildResponse, RecordCompletionRequest,
    TierStatsResponse, TiersResponse,
};
pub use handlers::{health, ProgressApiError, ProgressAppState};
pub use routes::{progress_router, progress_routes};
