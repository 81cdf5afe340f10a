//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - PostgreSQL-backed store, case catalog and user directory
//! - `storage` - In-memory progress store (testing/development)
//! - `catalog` - In-memory case catalog and user directory
//! - `http` - Axum REST API

pub mod catalog;
pub mod http;
pub mod postgres;
pub mod storage;
