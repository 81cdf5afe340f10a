//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ProgressStore` - Versioned progress records and the completion log
//! - `CaseCatalog` - Case difficulty lookup
//! - `UserDirectory` - Optional user existence check

mod case_catalog;
mod progress_store;
mod user_directory;

pub use case_catalog::{CaseCatalog, CaseSummary, CatalogError};
pub use progress_store::{ProgressCommit, ProgressStore, StoreError};
pub use user_directory::{DirectoryError, UserDirectory};
