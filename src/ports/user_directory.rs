//! UserDirectory port - optional user existence check.

use async_trait::async_trait;

use crate::domain::foundation::UserId;

/// Errors from the user directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("User directory unavailable: {0}")]
    Unavailable(String),
}

/// Port for checking that a user is known to the platform.
///
/// When no directory is wired in, the aggregator trusts the caller.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn exists(&self, user_id: &UserId) -> Result<bool, DirectoryError>;
}
