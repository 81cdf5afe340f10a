//! Progress aggregation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_CONFLICT_RETRIES: u32 = 1000;
const MAX_RETRY_BACKOFF_MS: u64 = 5_000;
const MAX_RECONCILE_CONCURRENCY: usize = 64;

/// Progress aggregation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressConfig {
    /// Attempts at a conflicting write before giving up
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// Base backoff between conflicting attempts, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Reject unrecognized difficulty labels instead of treating them as Beginner
    #[serde(default)]
    pub strict_difficulty_labels: bool,

    /// Reject completions, summaries and resets for users missing from the `users` table
    #[serde(default)]
    pub check_user_exists: bool,

    /// Maximum user rebuilds in flight during reconciliation
    #[serde(default = "default_reconcile_concurrency")]
    pub reconcile_concurrency: usize,
}

impl ProgressConfig {
    /// Backoff before retry number `attempt` (1-based), capped at ten steps.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms * u64::from(attempt.min(10)))
    }

    /// Set the retry budget
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    /// Set the base backoff
    pub fn with_retry_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.retry_backoff_ms = backoff_ms;
        self
    }

    /// Enable or disable strict difficulty labels
    pub fn with_strict_difficulty_labels(mut self, strict: bool) -> Self {
        self.strict_difficulty_labels = strict;
        self
    }

    /// Set reconciliation concurrency
    pub fn with_reconcile_concurrency(mut self, concurrency: usize) -> Self {
        self.reconcile_concurrency = concurrency;
        self
    }

    /// Validate progress configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_conflict_retries == 0 || self.max_conflict_retries > MAX_CONFLICT_RETRIES {
            return Err(ValidationError::InvalidRetryCount {
                max: MAX_CONFLICT_RETRIES,
            });
        }
        if self.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(ValidationError::InvalidRetryBackoff {
                max_ms: MAX_RETRY_BACKOFF_MS,
            });
        }
        if self.reconcile_concurrency == 0 || self.reconcile_concurrency > MAX_RECONCILE_CONCURRENCY
        {
            return Err(ValidationError::InvalidReconcileConcurrency {
                max: MAX_RECONCILE_CONCURRENCY,
            });
        }
        Ok(())
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            strict_difficulty_labels: false,
            check_user_exists: false,
            reconcile_concurrency: default_reconcile_concurrency(),
        }
    }
}

fn default_max_conflict_retries() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    10
}

fn default_reconcile_concurrency() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_config_defaults() {
        let config = ProgressConfig::default();
        assert_eq!(config.max_conflict_retries, 5);
        assert_eq!(config.retry_backoff_ms, 10);
        assert!(!config.strict_difficulty_labels);
        assert!(!config.check_user_exists);
        assert_eq!(config.reconcile_concurrency, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_is_linear_and_capped() {
        let config = ProgressConfig::default().with_retry_backoff_ms(10);
        assert_eq!(config.backoff_for(1), Duration::from_millis(10));
        assert_eq!(config.backoff_for(3), Duration::from_millis(30));
        assert_eq!(config.backoff_for(10), Duration::from_millis(100));
        assert_eq!(config.backoff_for(50), Duration::from_millis(100));
    }

    #[test]
    fn test_validation_rejects_zero_retries() {
        let config = ProgressConfig::default().with_max_conflict_retries(0);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRetryCount { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_excessive_backoff() {
        let config = ProgressConfig::default().with_retry_backoff_ms(60_000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let config = ProgressConfig::default().with_reconcile_concurrency(0);
        assert!(config.validate().is_err());
    }
}
