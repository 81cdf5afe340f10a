//! PostgreSQL implementation of ProgressStore.
//!
//! One row per user in `user_progress`, guarded by a `version` column, and an
//! append-only `case_completions` log. Each commit runs in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{CaseId, CompletionId, Score, Timestamp, UserId};
use crate::domain::progress::{
    CaseCompletion, DifficultyTier, ProgressRecord, ProgressRecordParts, ProgressionLevel,
    TierBreakdown, TierStats,
};
use crate::ports::{ProgressCommit, ProgressStore, StoreError};

/// PostgreSQL implementation of the ProgressStore port.
#[derive(Clone)]
pub struct PostgresProgressStore {
    pool: PgPool,
}

impl PostgresProgressStore {
    /// Creates a new PostgresProgressStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a progress record.
#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    user_id: String,
    beginner_completed: i32,
    beginner_score_units: i64,
    intermediate_completed: i32,
    intermediate_score_units: i64,
    advanced_completed: i32,
    advanced_score_units: i64,
    total_cases_completed: i32,
    overall_score_units: i64,
    current_level: String,
    last_updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<ProgressRow> for ProgressRecord {
    type Error = StoreError;

    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        let tiers = TierBreakdown {
            beginner: TierStats::from_parts(
                count_from_db(row.beginner_completed)?,
                row.beginner_score_units,
            ),
            intermediate: TierStats::from_parts(
                count_from_db(row.intermediate_completed)?,
                row.intermediate_score_units,
            ),
            advanced: TierStats::from_parts(
                count_from_db(row.advanced_completed)?,
                row.advanced_score_units,
            ),
        };

        let level = ProgressionLevel::from_storage(&row.current_level).ok_or_else(|| {
            StoreError::Database(format!("Invalid progression level: {}", row.current_level))
        })?;

        Ok(ProgressRecord::from_parts(ProgressRecordParts {
            user_id: UserId::new(row.user_id)
                .map_err(|e| StoreError::Database(format!("Invalid user_id: {}", e)))?,
            tiers,
            overall: TierStats::from_parts(
                count_from_db(row.total_cases_completed)?,
                row.overall_score_units,
            ),
            level,
            last_updated_at: Timestamp::from_datetime(row.last_updated_at),
            version: u64::try_from(row.version)
                .map_err(|_| StoreError::Database(format!("Invalid version: {}", row.version)))?,
        }))
    }
}

/// Database row representation of a logged completion.
#[derive(Debug, sqlx::FromRow)]
struct CompletionRow {
    id: Uuid,
    user_id: String,
    case_id: String,
    tier: String,
    score: f64,
    completed_at: DateTime<Utc>,
}

impl TryFrom<CompletionRow> for CaseCompletion {
    type Error = StoreError;

    fn try_from(row: CompletionRow) -> Result<Self, Self::Error> {
        let tier = DifficultyTier::from_storage(&row.tier)
            .ok_or_else(|| StoreError::Database(format!("Invalid tier: {}", row.tier)))?;

        Ok(CaseCompletion::new(
            CompletionId::from_uuid(row.id),
            UserId::new(row.user_id)
                .map_err(|e| StoreError::Database(format!("Invalid user_id: {}", e)))?,
            CaseId::new(row.case_id)
                .map_err(|e| StoreError::Database(format!("Invalid case_id: {}", e)))?,
            tier,
            Score::try_new(row.score)
                .map_err(|e| StoreError::Database(format!("Invalid score: {}", e)))?,
            Timestamp::from_datetime(row.completed_at),
        ))
    }
}

fn count_from_db(value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Database(format!("Negative count: {}", value)))
}

fn count_to_db(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Database(format!("Count overflow: {}", value)))
}

fn version_to_db(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Database(format!("Version overflow: {}", value)))
}

fn db_error(context: &str, e: sqlx::Error) -> StoreError {
    StoreError::Database(format!("{}: {}", context, e))
}

/// Inserts a first record or updates an existing one at the expected version.
///
/// Returns the number of rows written; 0 means the version check failed.
async fn write_record(
    tx: &mut Transaction<'_, Postgres>,
    record: &ProgressRecord,
    expected_version: u64,
) -> Result<u64, StoreError> {
    let tiers = record.tiers();
    let sql = if expected_version == 0 {
        r#"
        INSERT INTO user_progress (
            user_id,
            beginner_completed, beginner_score_units, beginner_average_score,
            intermediate_completed, intermediate_score_units, intermediate_average_score,
            advanced_completed, advanced_score_units, advanced_average_score,
            total_cases_completed, overall_score_units, overall_average_score,
            current_level, last_updated_at, version
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ON CONFLICT (user_id) DO NOTHING
        "#
    } else {
        r#"
        UPDATE user_progress SET
            beginner_completed = $2,
            beginner_score_units = $3,
            beginner_average_score = $4,
            intermediate_completed = $5,
            intermediate_score_units = $6,
            intermediate_average_score = $7,
            advanced_completed = $8,
            advanced_score_units = $9,
            advanced_average_score = $10,
            total_cases_completed = $11,
            overall_score_units = $12,
            overall_average_score = $13,
            current_level = $14,
            last_updated_at = $15,
            version = $16
        WHERE user_id = $1 AND version = $17
        "#
    };

    let mut query = sqlx::query(sql)
        .bind(record.user_id().as_str())
        .bind(count_to_db(tiers.beginner.cases_completed())?)
        .bind(tiers.beginner.score_units())
        .bind(tiers.beginner.average_score())
        .bind(count_to_db(tiers.intermediate.cases_completed())?)
        .bind(tiers.intermediate.score_units())
        .bind(tiers.intermediate.average_score())
        .bind(count_to_db(tiers.advanced.cases_completed())?)
        .bind(tiers.advanced.score_units())
        .bind(tiers.advanced.average_score())
        .bind(count_to_db(record.total_cases_completed())?)
        .bind(record.overall().score_units())
        .bind(record.overall_average_score())
        .bind(record.current_progression_level().as_str())
        .bind(record.last_updated_at().as_datetime())
        .bind(version_to_db(record.version())?);
    if expected_version > 0 {
        query = query.bind(version_to_db(expected_version)?);
    }

    let result = query
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to write progress", e))?;

    Ok(result.rows_affected())
}

#[async_trait]
impl ProgressStore for PostgresProgressStore {
    async fn load(&self, user_id: &UserId) -> Result<Option<ProgressRecord>, StoreError> {
        let row: Option<ProgressRow> = sqlx::query_as(
            r#"
            SELECT user_id,
                   beginner_completed, beginner_score_units,
                   intermediate_completed, intermediate_score_units,
                   advanced_completed, advanced_score_units,
                   total_cases_completed, overall_score_units,
                   current_level, last_updated_at, version
            FROM user_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load progress", e))?;

        row.map(ProgressRecord::try_from).transpose()
    }

    async fn commit(&self, commit: ProgressCommit) -> Result<(), StoreError> {
        let user_id = commit.record.user_id().clone();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let written = write_record(&mut tx, &commit.record, commit.expected_version).await?;
        if written == 0 {
            // Dropping the transaction rolls it back.
            return Err(StoreError::VersionConflict { user_id });
        }

        if commit.clear_history {
            sqlx::query("DELETE FROM case_completions WHERE user_id = $1")
                .bind(user_id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to clear completions", e))?;
        }

        if let Some(completion) = &commit.completion {
            let result = sqlx::query(
                r#"
                INSERT INTO case_completions (id, user_id, case_id, tier, score, completed_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(completion.id().as_uuid())
            .bind(completion.user_id().as_str())
            .bind(completion.case_id().as_str())
            .bind(completion.tier().as_str())
            .bind(completion.score().value())
            .bind(completion.completed_at().as_datetime())
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => {}
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    return Err(StoreError::DuplicateCompletion(completion.id()));
                }
                Err(e) => return Err(db_error("Failed to log completion", e)),
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn completions(&self, user_id: &UserId) -> Result<Vec<CaseCompletion>, StoreError> {
        let rows: Vec<CompletionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, case_id, tier, score, completed_at
            FROM case_completions
            WHERE user_id = $1
            ORDER BY completed_at ASC, id ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load completions", e))?;

        rows.into_iter().map(CaseCompletion::try_from).collect()
    }

    async fn user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM user_progress
            UNION
            SELECT user_id FROM case_completions
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list users", e))?;

        ids.into_iter()
            .map(|id| {
                UserId::new(id).map_err(|e| StoreError::Database(format!("Invalid user_id: {}", e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ProgressRow {
        ProgressRow {
            user_id: "student-7".to_string(),
            beginner_completed: 11,
            beginner_score_units: 790_000_000,
            intermediate_completed: 0,
            intermediate_score_units: 0,
            advanced_completed: 0,
            advanced_score_units: 0,
            total_cases_completed: 11,
            overall_score_units: 790_000_000,
            current_level: "intermediate".to_string(),
            last_updated_at: Utc::now(),
            version: 11,
        }
    }

    #[test]
    fn row_converts_to_record() {
        let record = ProgressRecord::try_from(row()).unwrap();

        assert_eq!(record.user_id().as_str(), "student-7");
        assert_eq!(record.tier(DifficultyTier::Beginner).average_score(), 71.82);
        assert_eq!(record.current_progression_level(), ProgressionLevel::Intermediate);
        assert_eq!(record.version(), 11);
        assert!(record.verify_consistency().is_empty());
    }

    #[test]
    fn row_with_unknown_level_is_rejected() {
        let mut bad = row();
        bad.current_level = "grandmaster".to_string();
        assert!(matches!(
            ProgressRecord::try_from(bad),
            Err(StoreError::Database(_))
        ));
    }

    #[test]
    fn row_with_negative_count_is_rejected() {
        let mut bad = row();
        bad.advanced_completed = -1;
        assert!(ProgressRecord::try_from(bad).is_err());
    }

    #[test]
    fn completion_row_converts() {
        let id = Uuid::new_v4();
        let completion = CaseCompletion::try_from(CompletionRow {
            id,
            user_id: "student-7".to_string(),
            case_id: "cardio-3".to_string(),
            tier: "advanced".to_string(),
            score: 88.5,
            completed_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(completion.id(), CompletionId::from_uuid(id));
        assert_eq!(completion.tier(), DifficultyTier::Advanced);
        assert_eq!(completion.score().value(), 88.5);
    }
}
