//! Error taxonomy for progress operations.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Errors surfaced by the progress aggregator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgressError {
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("concurrent update conflict for user {user_id} after {attempts} attempts")]
    ConcurrencyConflict { user_id: String, attempts: u32 },

    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl ProgressError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProgressError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn case_not_found(id: impl Into<String>) -> Self {
        ProgressError::NotFound {
            entity: "case",
            id: id.into(),
        }
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        ProgressError::NotFound {
            entity: "user",
            id: id.into(),
        }
    }

    /// Stable code for API clients.
    pub fn code(&self) -> ErrorCode {
        match self {
            ProgressError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            ProgressError::NotFound { entity: "user", .. } => ErrorCode::UserNotFound,
            ProgressError::NotFound { .. } => ErrorCode::CaseNotFound,
            ProgressError::ConcurrencyConflict { .. } => ErrorCode::ConcurrencyConflict,
            ProgressError::StorageFailure(_) => ErrorCode::StorageFailure,
        }
    }

    /// Only conflicts are worth retrying; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProgressError::ConcurrencyConflict { .. })
    }
}

impl From<ValidationError> for ProgressError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        ProgressError::InvalidArgument {
            field,
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_becomes_invalid_argument() {
        let err: ProgressError = ValidationError::empty_field("user_id").into();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        match err {
            ProgressError::InvalidArgument { field, .. } => assert_eq!(field, "user_id"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn not_found_codes_distinguish_entity() {
        assert_eq!(ProgressError::case_not_found("c1").code(), ErrorCode::CaseNotFound);
        assert_eq!(ProgressError::user_not_found("u1").code(), ErrorCode::UserNotFound);
    }

    #[test]
    fn only_conflicts_are_retryable() {
        let conflict = ProgressError::ConcurrencyConflict {
            user_id: "u1".to_string(),
            attempts: 5,
        };
        assert!(conflict.is_retryable());
        assert!(!ProgressError::StorageFailure("down".to_string()).is_retryable());
        assert!(!ProgressError::case_not_found("c1").is_retryable());
    }

    #[test]
    fn display_includes_context() {
        let err = ProgressError::case_not_found("cardio-12");
        assert_eq!(err.to_string(), "case not found: cardio-12");
    }
}
