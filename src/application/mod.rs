//! Application layer - orchestrates domain operations across ports.
//!
//! - `ProgressAggregator` - record, read, reset and rebuild a user's progress
//! - `ProgressReconciler` - rebuild every user, reporting repairs and failures

mod progress_aggregator;
mod reconciler;

pub use progress_aggregator::{ProgressAggregator, RebuildOutcome, RecordCompletionCommand};
pub use reconciler::{ProgressReconciler, ReconcileFailure, ReconcileReport};
