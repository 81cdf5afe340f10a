//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the progress domain.

mod errors;
mod ids;
mod score;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{CaseId, CompletionId, UserId};
pub use score::{rounded_mean, Score, SCORE_UNITS_PER_POINT};
pub use timestamp::Timestamp;
