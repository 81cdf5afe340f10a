//! CaseCatalog port - read-only lookup of case metadata.
//!
//! Case content lives outside this service; progress only needs the
//! free-text difficulty label of a case.

use async_trait::async_trait;

use crate::domain::foundation::CaseId;

/// Errors from the case catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Case catalog unavailable: {0}")]
    Unavailable(String),
}

/// Difficulty information for a single case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSummary {
    pub case_id: CaseId,
    pub difficulty_label: String,
}

impl CaseSummary {
    pub fn new(case_id: CaseId, difficulty_label: impl Into<String>) -> Self {
        Self {
            case_id,
            difficulty_label: difficulty_label.into(),
        }
    }
}

/// Port for resolving cases.
#[async_trait]
pub trait CaseCatalog: Send + Sync {
    /// Find a case by ID.
    ///
    /// Returns `Ok(None)` when the case does not exist.
    async fn find_case(&self, case_id: &CaseId) -> Result<Option<CaseSummary>, CatalogError>;
}
