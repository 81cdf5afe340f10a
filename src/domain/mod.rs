//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `progress` - Per-user progress aggregate, difficulty tiers and levels

pub mod foundation;
pub mod progress;
