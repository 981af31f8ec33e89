//! In-memory store
//!
//! Same semantics as the PostgreSQL store: every operation runs inside one
//! critical section over the store mutex, and records are only applied once
//! the audit entry for them has been sealed.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{now, page_offset, AssetsRepository, AuditRepository, LoansRepository, Store, UsersRepository};
use crate::{
    error::{AppError, AppResult},
    lifecycle,
    models::{
        asset::{Asset, AssetDetails, AssetSummary, CategoryCount, CreateAsset, ServiceReminder, StatusCount, UpdateAsset},
        audit::{AuditEntry, AuditLogView, NewAuditEntry, GENESIS_HASH},
        enums::{AssetStatus, LoanStatus},
        loan::{CreateLoan, Loan},
        maintenance::{CreateMaintenance, Maintenance},
        mutation::{CreateMutation, Mutation, MutationWithUser},
        user::{NewUser, User},
    },
};

#[derive(Default)]
struct State {
    assets: HashMap<Uuid, Asset>,
    mutations: Vec<Mutation>,
    maintenances: Vec<Maintenance>,
    loans: Vec<Loan>,
    audit: Vec<AuditEntry>,
    users: HashMap<Uuid, User>,
    #[cfg(test)]
    fail_audit: bool,
}

impl State {
    fn asset(&self, id: Uuid) -> AppResult<&Asset> {
        self.assets.get(&id).ok_or_else(|| lifecycle::asset_not_found(id))
    }

    fn user_name(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.users.get(&id)).map(|u| u.name.clone())
    }

    /// Build the next ledger entry without appending it
    fn seal(&self, entry: NewAuditEntry, at: DateTime<Utc>) -> AppResult<AuditEntry> {
        self.check_audit_available()?;
        let (seq, prev_hash) = match self.audit.last() {
            Some(last) => (last.seq + 1, last.hash.as_str()),
            None => (1, GENESIS_HASH),
        };
        Ok(entry.seal(seq, prev_hash, at))
    }

    #[cfg(test)]
    fn check_audit_available(&self) -> AppResult<()> {
        if self.fail_audit {
            return Err(AppError::Internal("audit ledger unavailable".to_string()));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_audit_available(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Store kept entirely in process memory, used by tests and `memory://` deployments
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("In-memory store lock poisoned".to_string()))
    }

    /// Make every following audit append fail
    #[cfg(test)]
    pub fn fail_audit_writes(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_audit = fail;
        }
    }
}

#[async_trait]
impl AssetsRepository for MemoryRepository {
    async fn assets_list(&self) -> AppResult<Vec<AssetSummary>> {
        let state = self.lock()?;
        let mut assets: Vec<&Asset> = state.assets.values().collect();
        assets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(assets
            .into_iter()
            .map(|asset| AssetSummary {
                asset: asset.clone(),
                latest_mutation: state
                    .mutations
                    .iter()
                    .rev()
                    .find(|m| m.asset_id == asset.id)
                    .cloned(),
            })
            .collect())
    }

    async fn assets_get_by_id(&self, id: Uuid) -> AppResult<Asset> {
        let state = self.lock()?;
        state.asset(id).cloned()
    }

    async fn assets_get_details(&self, id: Uuid) -> AppResult<AssetDetails> {
        let state = self.lock()?;
        let asset = state.asset(id)?.clone();

        let mutations = state
            .mutations
            .iter()
            .rev()
            .filter(|m| m.asset_id == id)
            .map(|m| MutationWithUser {
                mutation: m.clone(),
                user_name: state.user_name(m.user_id),
            })
            .collect();
        let maintenances = state
            .maintenances
            .iter()
            .rev()
            .filter(|m| m.asset_id == id)
            .cloned()
            .collect();
        let loans = state.loans.iter().rev().filter(|l| l.asset_id == id).cloned().collect();

        Ok(AssetDetails {
            asset,
            mutations,
            maintenances,
            loans,
        })
    }

    async fn assets_create(&self, actor: Option<Uuid>, data: &CreateAsset) -> AppResult<Asset> {
        let mut state = self.lock()?;
        let at = now();
        let asset = data.to_asset(Uuid::new_v4(), at);
        lifecycle::ensure_initial_status(asset.status)?;

        if state.assets.values().any(|a| a.code == asset.code) {
            return Err(AppError::Conflict(format!("Asset with code {} already exists", asset.code)));
        }

        let entry = state.seal(NewAuditEntry::asset_created(actor, &asset)?, at)?;
        state.assets.insert(asset.id, asset.clone());
        state.audit.push(entry);
        Ok(asset)
    }

    async fn assets_update(&self, actor: Option<Uuid>, id: Uuid, data: &UpdateAsset) -> AppResult<Asset> {
        let mut state = self.lock()?;
        let at = now();
        let old = state.asset(id)?.clone();
        lifecycle::ensure_operator_status_change(old.status, data.status)?;

        let updated = data.apply_to(&old, at);
        let entry = state.seal(NewAuditEntry::asset_updated(actor, &old, &updated)?, at)?;
        state.assets.insert(id, updated.clone());
        state.audit.push(entry);
        Ok(updated)
    }

    async fn assets_delete(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<()> {
        let mut state = self.lock()?;
        let at = now();
        let asset = state.asset(id)?.clone();
        let has_active_loan = state.loans.iter().any(|l| l.asset_id == id && l.is_active());
        lifecycle::ensure_deletable(has_active_loan)?;

        let entry = state.seal(NewAuditEntry::asset_deleted(actor, &asset)?, at)?;
        state.audit.push(entry);
        state.mutations.retain(|m| m.asset_id != id);
        state.maintenances.retain(|m| m.asset_id != id);
        state.loans.retain(|l| l.asset_id != id);
        state.assets.remove(&id);
        Ok(())
    }

    async fn assets_relocate(&self, actor: Option<Uuid>, data: &CreateMutation) -> AppResult<Mutation> {
        let mut state = self.lock()?;
        let at = now();
        let asset = state.asset(data.asset_id)?;
        let mutation = data.to_mutation(&asset.location, actor, at);

        let entry = state.seal(NewAuditEntry::relocated(actor, &mutation)?, at)?;
        if let Some(asset) = state.assets.get_mut(&data.asset_id) {
            asset.location = mutation.to_location.clone();
            asset.updated_at = at;
        }
        state.mutations.push(mutation.clone());
        state.audit.push(entry);
        Ok(mutation)
    }

    async fn assets_record_maintenance(
        &self,
        actor: Option<Uuid>,
        data: &CreateMaintenance,
    ) -> AppResult<Maintenance> {
        let mut state = self.lock()?;
        let at = now();
        state.asset(data.asset_id)?;
        let maintenance = data.to_maintenance(actor, at);

        let entry = state.seal(NewAuditEntry::maintained(actor, &maintenance)?, at)?;
        if let Some(asset) = state.assets.get_mut(&data.asset_id) {
            if maintenance.next_service_date.is_some() {
                asset.next_service_date = maintenance.next_service_date;
            }
            asset.updated_at = at;
        }
        state.maintenances.push(maintenance.clone());
        state.audit.push(entry);
        Ok(maintenance)
    }

    async fn assets_count(&self) -> AppResult<i64> {
        Ok(self.lock()?.assets.len() as i64)
    }

    async fn assets_count_by_status(&self) -> AppResult<Vec<StatusCount>> {
        let state = self.lock()?;
        let mut counts: Vec<StatusCount> = AssetStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: state.assets.values().filter(|a| a.status == *status).count() as i64,
            })
            .filter(|c| c.count > 0)
            .collect();
        counts.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str()));
        Ok(counts)
    }

    async fn assets_count_by_category(&self) -> AppResult<Vec<CategoryCount>> {
        let state = self.lock()?;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for asset in state.assets.values() {
            *counts.entry(asset.category.as_str()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect())
    }

    async fn assets_service_due(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Vec<ServiceReminder>> {
        let state = self.lock()?;
        let mut due: Vec<ServiceReminder> = state
            .assets
            .values()
            .filter_map(|a| {
                let date = a.next_service_date?;
                (date >= from && date <= until).then(|| ServiceReminder {
                    id: a.id,
                    code: a.code.clone(),
                    name: a.name.clone(),
                    location: a.location.clone(),
                    next_service_date: date,
                })
            })
            .collect();
        due.sort_by(|a, b| a.next_service_date.cmp(&b.next_service_date));
        Ok(due)
    }
}

#[async_trait]
impl LoansRepository for MemoryRepository {
    async fn loans_start(&self, actor: Option<Uuid>, data: &CreateLoan) -> AppResult<Loan> {
        let mut state = self.lock()?;
        let at = now();
        lifecycle::ensure_loanable(state.asset(data.asset_id)?)?;
        let loan = data.to_loan(actor, at);

        let entry = state.seal(NewAuditEntry::loan_started(actor, &loan)?, at)?;
        if let Some(asset) = state.assets.get_mut(&data.asset_id) {
            asset.status = AssetStatus::Loaned;
            asset.updated_at = at;
        }
        state.loans.push(loan.clone());
        state.audit.push(entry);
        Ok(loan)
    }

    async fn loans_return(&self, actor: Option<Uuid>, loan_id: Uuid) -> AppResult<Loan> {
        let mut state = self.lock()?;
        let at = now();
        let index = state
            .loans
            .iter()
            .position(|l| l.id == loan_id)
            .ok_or_else(|| lifecycle::loan_not_found(loan_id))?;
        lifecycle::ensure_returnable(&state.loans[index])?;

        let mut loan = state.loans[index].clone();
        loan.status = LoanStatus::Returned;
        loan.return_date = Some(at);

        let entry = state.seal(NewAuditEntry::loan_returned(actor, &loan)?, at)?;
        if let Some(asset) = state.assets.get_mut(&loan.asset_id) {
            asset.status = AssetStatus::Available;
            asset.updated_at = at;
        }
        state.loans[index] = loan.clone();
        state.audit.push(entry);
        Ok(loan)
    }

    async fn loans_get_by_id(&self, id: Uuid) -> AppResult<Loan> {
        let state = self.lock()?;
        state
            .loans
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    async fn loans_list(&self, status: Option<LoanStatus>) -> AppResult<Vec<Loan>> {
        let state = self.lock()?;
        Ok(state
            .loans
            .iter()
            .rev()
            .filter(|l| status.map_or(true, |s| l.status == s))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditRepository for MemoryRepository {
    async fn audit_record(&self, entry: NewAuditEntry) -> AppResult<AuditEntry> {
        let mut state = self.lock()?;
        let entry = state.seal(entry, now())?;
        state.audit.push(entry.clone());
        Ok(entry)
    }

    async fn audit_list(&self, page: i64, per_page: i64) -> AppResult<(Vec<AuditLogView>, i64)> {
        let state = self.lock()?;
        let offset = usize::try_from(page_offset(page, per_page)).unwrap_or(usize::MAX);
        let items = state
            .audit
            .iter()
            .rev()
            .skip(offset)
            .take(per_page.max(0) as usize)
            .map(|entry| AuditLogView {
                entry: entry.clone(),
                user_name: state.user_name(entry.user_id),
            })
            .collect();
        Ok((items, state.audit.len() as i64))
    }

    async fn audit_ledger(&self) -> AppResult<Vec<AuditEntry>> {
        Ok(self.lock()?.audit.clone())
    }
}

#[async_trait]
impl UsersRepository for MemoryRepository {
    async fn users_get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn users_get_by_id(&self, id: Uuid) -> AppResult<User> {
        let state = self.lock()?;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn users_count(&self) -> AppResult<i64> {
        Ok(self.lock()?.users.len() as i64)
    }

    async fn users_create(&self, user: &NewUser) -> AppResult<User> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!("User {} already exists", user.username)));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: now(),
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl Store for MemoryRepository {
    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }
}
