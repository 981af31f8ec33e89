//! Audit ledger read surface

use crate::{
    error::AppResult,
    models::audit::{verify_chain, AuditLogView, AuditQuery, ChainVerification},
    repository::{AuditRepository, Repository},
};

#[derive(Clone)]
pub struct AuditService {
    repository: Repository,
}

impl AuditService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// One page of entries, newest first, with the total count
    pub async fn list(&self, query: &AuditQuery) -> AppResult<(Vec<AuditLogView>, i64)> {
        let (page, per_page) = query.paging();
        self.repository.audit_list(page, per_page).await
    }

    /// Walk the whole ledger and report the first broken link
    pub async fn verify(&self) -> AppResult<ChainVerification> {
        let ledger = self.repository.audit_ledger().await?;
        let report = verify_chain(&ledger);
        if report.valid {
            tracing::info!(checked = report.checked, "Audit chain verified");
        } else {
            tracing::error!(broken_at = ?report.broken_at, "Audit chain verification failed");
        }
        Ok(report)
    }
}
