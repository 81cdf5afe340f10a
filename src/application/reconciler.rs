//! ProgressReconciler - bulk drift repair across every user.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info};

use crate::domain::foundation::UserId;
use crate::domain::progress::ProgressError;
use crate::ports::ProgressStore;

use super::ProgressAggregator;

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub users_checked: usize,
    pub users_repaired: usize,
    pub failures: Vec<ReconcileFailure>,
}

/// A user whose rebuild failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileFailure {
    pub user_id: UserId,
    pub error: String,
}

/// Rebuilds every known user with bounded concurrency.
pub struct ProgressReconciler {
    aggregator: Arc<ProgressAggregator>,
    store: Arc<dyn ProgressStore>,
    concurrency: usize,
}

impl ProgressReconciler {
    pub fn new(
        aggregator: Arc<ProgressAggregator>,
        store: Arc<dyn ProgressStore>,
        concurrency: usize,
    ) -> Self {
        Self {
            aggregator,
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Rebuilds every user; one user's failure never stops the others.
    ///
    /// # Errors
    /// Returns `StorageFailure` only if the user list itself cannot be read.
    pub async fn reconcile_all(&self) -> Result<ReconcileReport, ProgressError> {
        let user_ids = self
            .store
            .user_ids()
            .await
            .map_err(|e| ProgressError::StorageFailure(e.to_string()))?;

        let results: Vec<_> = stream::iter(user_ids)
            .map(|user_id| async move {
                let result = self.aggregator.rebuild_progress(user_id.as_str()).await;
                (user_id, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = ReconcileReport::default();
        for (user_id, result) in results {
            report.users_checked += 1;
            match result {
                Ok(outcome) if outcome.drift_detected => report.users_repaired += 1,
                Ok(_) => {}
                Err(e) => {
                    error!(user_id = %user_id, error = %e, "Failed to reconcile progress");
                    report.failures.push(ReconcileFailure {
                        user_id,
                        error: e.to_string(),
                    });
                }
            }
        }
        report.failures.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        info!(
            checked = report.users_checked,
            repaired = report.users_repaired,
            failed = report.failures.len(),
            "Progress reconciliation finished"
        );

        Ok(report)
    }
}
