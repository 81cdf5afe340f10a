//! PostgreSQL adapters - Database implementations for the ports.
//!
//! - `PostgresProgressStore` - Versioned progress rows and the completion log
//! - `PostgresCaseCatalog` - Case difficulty lookup
//! - `PostgresUserDirectory` - User existence check

mod case_catalog;
mod progress_store;
mod user_directory;

pub use case_catalog::PostgresCaseCatalog;
pub use progress_store::PostgresProgressStore;
pub use user_directory::PostgresUserDirectory;
