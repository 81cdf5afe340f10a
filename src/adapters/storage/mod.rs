//! Storage Adapters
//!
//! In-process implementation of the ProgressStore port.
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemoryProgressStore;
//!
//! let store = Arc::new(InMemoryProgressStore::new());
//! ```

mod in_memory_progress_store;

pub use in_memory_progress_store::InMemoryProgressStore;
