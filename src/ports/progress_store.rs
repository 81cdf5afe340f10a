//! ProgressStore port - versioned persistence of progress records.
//!
//! Writes are optimistic: a commit names the version it read, and the store
//! refuses it if the stored record has moved on. The record, the optional
//! completion log entry and the optional history purge are written in one
//! transaction.

use async_trait::async_trait;

use crate::domain::foundation::{CompletionId, UserId};
use crate::domain::progress::{CaseCompletion, ProgressRecord};

/// Errors that can occur during progress storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored version no longer matches the version the write was based on.
    #[error("Version conflict for user {user_id}")]
    VersionConflict { user_id: UserId },

    /// The completion was already applied.
    #[error("Completion already recorded: {0}")]
    DuplicateCompletion(CompletionId),

    #[error("Database error: {0}")]
    Database(String),
}

/// A single atomic write.
#[derive(Debug, Clone)]
pub struct ProgressCommit {
    /// Record to store. Its version must be `expected_version + 1`.
    pub record: ProgressRecord,

    /// Version the write was computed from; 0 when no record existed.
    pub expected_version: u64,

    /// Completion to append to the user's log.
    pub completion: Option<CaseCompletion>,

    /// Drop the user's completion log before appending.
    pub clear_history: bool,
}

impl ProgressCommit {
    pub fn new(record: ProgressRecord, expected_version: u64) -> Self {
        Self {
            record,
            expected_version,
            completion: None,
            clear_history: false,
        }
    }

    pub fn with_completion(mut self, completion: CaseCompletion) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn clearing_history(mut self) -> Self {
        self.clear_history = true;
        self
    }
}

/// Port for loading and committing progress records.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the stored record for a user, if any.
    async fn load(&self, user_id: &UserId) -> Result<Option<ProgressRecord>, StoreError>;

    /// Atomically apply a commit.
    ///
    /// # Errors
    /// - `VersionConflict` if the stored version differs from `expected_version`
    /// - `DuplicateCompletion` if the completion id is already in the log
    ///
    /// Nothing is written when an error is returned.
    async fn commit(&self, commit: ProgressCommit) -> Result<(), StoreError>;

    /// The user's completion log, oldest first.
    async fn completions(&self, user_id: &UserId) -> Result<Vec<CaseCompletion>, StoreError>;

    /// Every user with a stored record or logged completion.
    async fn user_ids(&self) -> Result<Vec<UserId>, StoreError>;
}
