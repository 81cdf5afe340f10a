//! In-memory CaseCatalog for development and testing.
//!
//! # Usage
//!
//! ```ignore
//! use medsim_progress::adapters::catalog::InMemoryCaseCatalog;
//!
//! let catalog = InMemoryCaseCatalog::new()
//!     .with_case(CaseId::new("cardio-1")?, "Easy");
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::CaseId;
use crate::ports::{CaseCatalog, CaseSummary, CatalogError};

/// Case catalog backed by a map of case id to difficulty label.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseCatalog {
    cases: Arc<RwLock<HashMap<CaseId, String>>>,
}

impl InMemoryCaseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration, for use before the catalog is shared.
    pub fn with_case(self, case_id: CaseId, difficulty_label: impl Into<String>) -> Self {
        if let Ok(mut cases) = self.cases.try_write() {
            cases.insert(case_id, difficulty_label.into());
        }
        self
    }

    /// Register or relabel a case.
    pub async fn insert(&self, case_id: CaseId, difficulty_label: impl Into<String>) {
        self.cases.write().await.insert(case_id, difficulty_label.into());
    }
}

#[async_trait]
impl CaseCatalog for InMemoryCaseCatalog {
    async fn find_case(&self, case_id: &CaseId) -> Result<Option<CaseSummary>, CatalogError> {
        let cases = self.cases.read().await;
        Ok(cases
            .get(case_id)
            .map(|label| CaseSummary::new(case_id.clone(), label.clone())))
    }
}
