//! Medsim Progress - Case completion progress tracking
//!
//! Maintains per-user running statistics over completed simulation cases,
//! segmented by difficulty tier, and derives a progression level from them.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
