//! ProgressAggregator - the only writer of progress records.
//!
//! Every write is an optimistic read-modify-write: load the record, compute
//! the new state, commit conditioned on the version that was read. A stale
//! commit is retried from a fresh load, so concurrent completions for the
//! same user never lose updates. Different users never contend.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ProgressConfig;
use crate::domain::foundation::{CaseId, CompletionId, Score, Timestamp, UserId};
use crate::domain::progress::{
    CaseCompletion, ConsistencyIssue, DifficultyTier, ProgressError, ProgressRecord,
};
use crate::ports::{CaseCatalog, ProgressCommit, ProgressStore, StoreError, UserDirectory};

/// Command to record one completed case.
#[derive(Debug, Clone)]
pub struct RecordCompletionCommand {
    pub user_id: String,
    pub case_id: String,
    /// Missing or non-finite scores are rejected.
    pub score: Option<f64>,
    /// Idempotency key; a retried request with the same id is applied once.
    pub completion_id: Option<CompletionId>,
}

/// Result of replaying a user's completion log.
#[derive(Debug, Clone)]
pub struct RebuildOutcome {
    pub record: ProgressRecord,
    /// True when the stored record differed and was replaced.
    pub drift_detected: bool,
    /// Invariant violations found on the stored record before the rebuild.
    pub issues: Vec<ConsistencyIssue>,
}

/// What one attempt of a write decided to do.
enum Plan {
    Commit(ProgressCommit),
    Unchanged(ProgressRecord),
}

/// Outcome of a write loop.
struct Written {
    record: ProgressRecord,
    committed: bool,
}

/// Kinds of write the aggregator performs.
enum Change<'a> {
    Completion {
        case_id: &'a CaseId,
        tier: DifficultyTier,
        score: Score,
        completion_id: CompletionId,
    },
    Reset,
    Rebuild,
}

/// Application service for progress reads and writes.
pub struct ProgressAggregator {
    catalog: Arc<dyn CaseCatalog>,
    store: Arc<dyn ProgressStore>,
    users: Option<Arc<dyn UserDirectory>>,
    config: ProgressConfig,
}

impl ProgressAggregator {
    pub fn new(
        catalog: Arc<dyn CaseCatalog>,
        store: Arc<dyn ProgressStore>,
        config: ProgressConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            users: None,
            config,
        }
    }

    /// Enables user existence checks; without a directory the caller is trusted.
    pub fn with_user_directory(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    /// Records a completed case and returns the updated record.
    ///
    /// All validation happens before any write. On error nothing is stored.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id, case_id = %cmd.case_id))]
    pub async fn record_completion(
        &self,
        cmd: RecordCompletionCommand,
    ) -> Result<ProgressRecord, ProgressError> {
        let user_id = UserId::new(cmd.user_id)?;
        let case_id = CaseId::new(cmd.case_id)?;
        let score = Score::try_from_option(cmd.score)?;

        self.ensure_user_exists(&user_id).await?;
        let tier = self.resolve_tier(&case_id).await?;

        let change = Change::Completion {
            case_id: &case_id,
            tier,
            score,
            completion_id: cmd.completion_id.unwrap_or_default(),
        };
        let written = self.write_with_retry(&user_id, &change).await?;

        if written.committed {
            info!(
                user_id = %user_id,
                tier = %tier,
                score = score.value(),
                total = written.record.total_cases_completed(),
                level = %written.record.current_progression_level(),
                "Recorded case completion"
            );
        }

        Ok(written.record)
    }

    /// Returns the user's record, or a zeroed one if none exists. Never writes.
    #[tracing::instrument(skip(self))]
    pub async fn get_summary(&self, user_id: &str) -> Result<ProgressRecord, ProgressError> {
        let user_id = UserId::new(user_id)?;
        self.ensure_user_exists(&user_id).await?;

        Ok(self
            .load(&user_id)
            .await?
            .unwrap_or_else(|| ProgressRecord::new(user_id)))
    }

    /// Zeroes the user's record and clears their completion history.
    ///
    /// An already-zero or absent record is left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn reset_progress(&self, user_id: &str) -> Result<ProgressRecord, ProgressError> {
        let user_id = UserId::new(user_id)?;
        self.ensure_user_exists(&user_id).await?;

        let written = self.write_with_retry(&user_id, &Change::Reset).await?;
        if written.committed {
            info!(user_id = %user_id, "Reset progress");
        }
        Ok(written.record)
    }

    /// Rebuilds the record from the completion log, repairing drift.
    ///
    /// Not gated by the user directory: it repairs whatever the store holds,
    /// including users the directory no longer knows.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_progress(&self, user_id: &str) -> Result<RebuildOutcome, ProgressError> {
        let user_id = UserId::new(user_id)?;

        let issues = self
            .load(&user_id)
            .await?
            .map(|record| record.verify_consistency())
            .unwrap_or_default();

        let written = self.write_with_retry(&user_id, &Change::Rebuild).await?;
        if written.committed {
            warn!(
                user_id = %user_id,
                issues = issues.len(),
                "Repaired drifted progress record from completion log"
            );
        }

        Ok(RebuildOutcome {
            record: written.record,
            drift_detected: written.committed,
            issues,
        })
    }

    async fn ensure_user_exists(&self, user_id: &UserId) -> Result<(), ProgressError> {
        let Some(users) = &self.users else {
            return Ok(());
        };
        let exists = users
            .exists(user_id)
            .await
            .map_err(|e| ProgressError::StorageFailure(e.to_string()))?;
        if exists {
            Ok(())
        } else {
            Err(ProgressError::user_not_found(user_id.as_str()))
        }
    }

    async fn resolve_tier(&self, case_id: &CaseId) -> Result<DifficultyTier, ProgressError> {
        let case = self
            .catalog
            .find_case(case_id)
            .await
            .map_err(|e| ProgressError::StorageFailure(e.to_string()))?
            .ok_or_else(|| ProgressError::case_not_found(case_id.as_str()))?;

        match DifficultyTier::normalize(&case.difficulty_label) {
            Some(tier) => Ok(tier),
            None if self.config.strict_difficulty_labels => Err(ProgressError::invalid_argument(
                "difficulty",
                format!("unrecognized difficulty label '{}'", case.difficulty_label),
            )),
            None => {
                warn!(
                    case_id = %case_id,
                    label = %case.difficulty_label,
                    fallback = %DifficultyTier::FALLBACK,
                    "Unrecognized difficulty label"
                );
                Ok(DifficultyTier::FALLBACK)
            }
        }
    }

    async fn load(&self, user_id: &UserId) -> Result<Option<ProgressRecord>, ProgressError> {
        self.store.load(user_id).await.map_err(storage_failure)
    }

    /// Runs load, plan, commit until the commit lands or retries run out.
    async fn write_with_retry(
        &self,
        user_id: &UserId,
        change: &Change<'_>,
    ) -> Result<Written, ProgressError> {
        let max_attempts = self.config.max_conflict_retries.max(1);

        for attempt in 1..=max_attempts {
            let current = self.load(user_id).await?;

            let commit = match self.plan(user_id, change, current).await? {
                Plan::Unchanged(record) => {
                    return Ok(Written {
                        record,
                        committed: false,
                    })
                }
                Plan::Commit(commit) => commit,
            };
            let record = commit.record.clone();

            match self.store.commit(commit).await {
                Ok(()) => {
                    return Ok(Written {
                        record,
                        committed: true,
                    })
                }
                Err(StoreError::VersionConflict { .. }) => {
                    debug!(user_id = %user_id, attempt, "Version conflict, retrying");
                    if attempt < max_attempts {
                        tokio::time::sleep(self.config.backoff_for(attempt)).await;
                    }
                }
                Err(StoreError::DuplicateCompletion(id)) => {
                    info!(user_id = %user_id, completion_id = %id, "Completion already applied");
                    let record = self
                        .load(user_id)
                        .await?
                        .unwrap_or_else(|| ProgressRecord::new(user_id.clone()));
                    return Ok(Written {
                        record,
                        committed: false,
                    });
                }
                Err(e) => return Err(storage_failure(e)),
            }
        }

        warn!(user_id = %user_id, attempts = max_attempts, "Gave up after repeated conflicts");
        Err(ProgressError::ConcurrencyConflict {
            user_id: user_id.to_string(),
            attempts: max_attempts,
        })
    }

    /// Computes the write for one attempt from the freshly loaded record.
    async fn plan(
        &self,
        user_id: &UserId,
        change: &Change<'_>,
        current: Option<ProgressRecord>,
    ) -> Result<Plan, ProgressError> {
        let expected_version = current.as_ref().map_or(0, ProgressRecord::version);

        match change {
            Change::Completion {
                case_id,
                tier,
                score,
                completion_id,
            } => {
                let now = Timestamp::now();
                let mut record = current.unwrap_or_else(|| ProgressRecord::new(user_id.clone()));
                record.apply_completion(*tier, *score, now);
                record.advance_version();

                let completion = CaseCompletion::new(
                    *completion_id,
                    user_id.clone(),
                    (*case_id).clone(),
                    *tier,
                    *score,
                    now,
                );
                Ok(Plan::Commit(
                    ProgressCommit::new(record, expected_version).with_completion(completion),
                ))
            }

            Change::Reset => match current {
                None => Ok(Plan::Unchanged(ProgressRecord::new(user_id.clone()))),
                Some(record) if record.is_reset() => Ok(Plan::Unchanged(record)),
                Some(mut record) => {
                    record.reset(Timestamp::now());
                    record.advance_version();
                    Ok(Plan::Commit(
                        ProgressCommit::new(record, expected_version).clearing_history(),
                    ))
                }
            },

            Change::Rebuild => {
                // Read after the record so a completion landing in between
                // shows up as a version conflict rather than being lost.
                let log = self
                    .store
                    .completions(user_id)
                    .await
                    .map_err(storage_failure)?;

                let Some(stored) = current else {
                    if log.is_empty() {
                        return Ok(Plan::Unchanged(ProgressRecord::new(user_id.clone())));
                    }
                    let rebuilt = ProgressRecord::replay(user_id.clone(), &log).with_version(1);
                    return Ok(Plan::Commit(ProgressCommit::new(rebuilt, 0)));
                };

                if log.is_empty() && !stored.is_reset() {
                    // Records written before the completion log existed have
                    // nothing to replay against.
                    debug!(user_id = %user_id, "No completion history to rebuild from");
                    return Ok(Plan::Unchanged(stored));
                }

                let rebuilt = ProgressRecord::replay(user_id.clone(), &log);
                if rebuilt.same_progress(&stored) && stored.verify_consistency().is_empty() {
                    return Ok(Plan::Unchanged(stored));
                }

                let rebuilt = rebuilt.with_version(expected_version + 1);
                Ok(Plan::Commit(ProgressCommit::new(rebuilt, expected_version)))
            }
        }
    }
}

fn storage_failure(err: StoreError) -> ProgressError {
    ProgressError::StorageFailure(err.to_string())
}
