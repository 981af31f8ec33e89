//! Repository layer for persistence
//!
//! The store is split into one trait per domain. Every method that changes
//! state is a single atomic unit: the business write and its audit entry
//! commit together or not at all.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        asset::{Asset, AssetDetails, AssetSummary, CategoryCount, CreateAsset, ServiceReminder, StatusCount, UpdateAsset},
        audit::{AuditEntry, AuditLogView, NewAuditEntry},
        enums::LoanStatus,
        loan::{CreateLoan, Loan},
        maintenance::{CreateMaintenance, Maintenance},
        mutation::{CreateMutation, Mutation},
        user::{NewUser, User},
    },
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Shared store handle passed to every service
pub type Repository = Arc<dyn Store>;

/// Current time at the precision PostgreSQL keeps
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Row offset of a 1-based page, saturating for pages past the end of i64
pub(crate) fn page_offset(page: i64, per_page: i64) -> i64 {
    (page - 1).max(0).saturating_mul(per_page.max(0))
}

#[async_trait]
pub trait AssetsRepository: Send + Sync {
    /// All assets, most recently updated first, each with its latest mutation
    async fn assets_list(&self) -> AppResult<Vec<AssetSummary>>;

    async fn assets_get_by_id(&self, id: Uuid) -> AppResult<Asset>;

    /// Asset with mutations, maintenances and loans, newest first
    async fn assets_get_details(&self, id: Uuid) -> AppResult<AssetDetails>;

    async fn assets_create(&self, actor: Option<Uuid>, data: &CreateAsset) -> AppResult<Asset>;

    async fn assets_update(&self, actor: Option<Uuid>, id: Uuid, data: &UpdateAsset) -> AppResult<Asset>;

    /// Refused while an active loan exists; cascades the asset's history otherwise
    async fn assets_delete(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<()>;

    /// Record a mutation from the current location and move the asset
    async fn assets_relocate(&self, actor: Option<Uuid>, data: &CreateMutation) -> AppResult<Mutation>;

    async fn assets_record_maintenance(
        &self,
        actor: Option<Uuid>,
        data: &CreateMaintenance,
    ) -> AppResult<Maintenance>;

    async fn assets_count(&self) -> AppResult<i64>;

    async fn assets_count_by_status(&self) -> AppResult<Vec<StatusCount>>;

    async fn assets_count_by_category(&self) -> AppResult<Vec<CategoryCount>>;

    /// Assets whose next service date falls in `[from, until]`, soonest first
    async fn assets_service_due(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Vec<ServiceReminder>>;
}

#[async_trait]
pub trait LoansRepository: Send + Sync {
    /// Move an AVAILABLE asset to LOANED and open the loan
    async fn loans_start(&self, actor: Option<Uuid>, data: &CreateLoan) -> AppResult<Loan>;

    /// Close an ACTIVE loan and make its asset AVAILABLE again
    async fn loans_return(&self, actor: Option<Uuid>, loan_id: Uuid) -> AppResult<Loan>;

    async fn loans_get_by_id(&self, id: Uuid) -> AppResult<Loan>;

    /// Loans newest first, optionally filtered by status
    async fn loans_list(&self, status: Option<LoanStatus>) -> AppResult<Vec<Loan>>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append a standalone entry (used for events without a business write)
    async fn audit_record(&self, entry: NewAuditEntry) -> AppResult<AuditEntry>;

    /// One page of the ledger, newest first, with the total entry count
    async fn audit_list(&self, page: i64, per_page: i64) -> AppResult<(Vec<AuditLogView>, i64)>;

    /// The whole ledger in ascending order
    async fn audit_ledger(&self) -> AppResult<Vec<AuditEntry>>;
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn users_get_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn users_get_by_id(&self, id: Uuid) -> AppResult<User>;

    async fn users_count(&self) -> AppResult<i64>;

    async fn users_create(&self, user: &NewUser) -> AppResult<User>;
}

/// Complete store: every domain repository plus a liveness check
#[async_trait]
pub trait Store: AssetsRepository + LoansRepository + AuditRepository + UsersRepository {
    async fn ping(&self) -> AppResult<()>;
}
