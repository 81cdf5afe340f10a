//! In-memory UserDirectory for development and testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::ports::{DirectoryError, UserDirectory};

/// Directory holding a fixed set of known users.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashSet<UserId>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user_id: UserId) -> Self {
        if let Ok(mut users) = self.users.try_write() {
            users.insert(user_id);
        }
        self
    }

    pub async fn insert(&self, user_id: UserId) {
        self.users.write().await.insert(user_id);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn exists(&self, user_id: &UserId) -> Result<bool, DirectoryError> {
        Ok(self.users.read().await.contains(user_id))
    }
}
