//! PostgreSQL implementation of CaseCatalog.
//!
//! Reads the difficulty label from the `cases` table owned by the case
//! content service.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::CaseId;
use crate::ports::{CaseCatalog, CaseSummary, CatalogError};

/// PostgreSQL implementation of the CaseCatalog port.
#[derive(Clone)]
pub struct PostgresCaseCatalog {
    pool: PgPool,
}

impl PostgresCaseCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseCatalog for PostgresCaseCatalog {
    async fn find_case(&self, case_id: &CaseId) -> Result<Option<CaseSummary>, CatalogError> {
        let label: Option<String> =
            sqlx::query_scalar("SELECT difficulty FROM cases WHERE id = $1")
                .bind(case_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| CatalogError::Unavailable(format!("Failed to fetch case: {}", e)))?;

        Ok(label.map(|label| CaseSummary::new(case_id.clone(), label)))
    }
}
