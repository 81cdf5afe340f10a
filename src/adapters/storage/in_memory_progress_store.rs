//! In-Memory Progress Store Adapter
//!
//! Keeps records and completion logs in memory behind a single lock, so a
//! commit's version check and writes happen atomically.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CompletionId, UserId};
use crate::domain::progress::{CaseCompletion, ProgressRecord};
use crate::ports::{ProgressCommit, ProgressStore, StoreError};

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<UserId, ProgressRecord>,
    completions: HashMap<UserId, Vec<CaseCompletion>>,
    completion_ids: HashSet<CompletionId>,
}

/// In-memory storage for progress records
#[derive(Debug, Clone)]
pub struct InMemoryProgressStore {
    state: Arc<RwLock<StoreState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryProgressStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate a storage outage; every operation fails while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Write a record directly, bypassing the version check.
    ///
    /// Lets tests stage drifted or legacy records.
    pub async fn put_record(&self, record: ProgressRecord) {
        let mut state = self.state.write().await;
        state.records.insert(record.user_id().clone(), record);
    }

    /// Append to a user's log directly, without touching the record.
    pub async fn put_completion(&self, completion: CaseCompletion) {
        let mut state = self.state.write().await;
        state.completion_ids.insert(completion.id());
        state
            .completions
            .entry(completion.user_id().clone())
            .or_default()
            .push(completion);
    }

    /// Get the number of stored records
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database("store unavailable".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn load(&self, user_id: &UserId) -> Result<Option<ProgressRecord>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.records.get(user_id).cloned())
    }

    async fn commit(&self, commit: ProgressCommit) -> Result<(), StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let user_id = commit.record.user_id().clone();

        let current_version = state.records.get(&user_id).map_or(0, |r| r.version());
        if current_version != commit.expected_version {
            return Err(StoreError::VersionConflict { user_id });
        }

        // Validate everything before the first mutation.
        if let Some(completion) = &commit.completion {
            if state.completion_ids.contains(&completion.id()) {
                return Err(StoreError::DuplicateCompletion(completion.id()));
            }
        }

        if commit.clear_history {
            if let Some(log) = state.completions.remove(&user_id) {
                for completion in log {
                    state.completion_ids.remove(&completion.id());
                }
            }
        }

        if let Some(completion) = commit.completion {
            state.completion_ids.insert(completion.id());
            state
                .completions
                .entry(user_id.clone())
                .or_default()
                .push(completion);
        }

        state.records.insert(user_id, commit.record);
        Ok(())
    }

    async fn completions(&self, user_id: &UserId) -> Result<Vec<CaseCompletion>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut log = state.completions.get(user_id).cloned().unwrap_or_default();
        log.sort_by_key(|c| *c.completed_at());
        Ok(log)
    }

    async fn user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut ids: Vec<UserId> = state
            .records
            .keys()
            .chain(state.completions.keys())
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ids.sort();
        Ok(ids)
    }
}
