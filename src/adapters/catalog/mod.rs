//! Catalog Adapters
//!
//! In-process lookups for case metadata and known users, used in tests and
//! local development.

mod in_memory_case_catalog;
mod in_memory_user_directory;

pub use in_memory_case_catalog::InMemoryCaseCatalog;
pub use in_memory_user_directory::InMemoryUserDirectory;
