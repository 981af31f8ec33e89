//! Audit ledger model
//!
//! Entries are append-only and hash-chained: each entry commits to the hash
//! of its predecessor, so rewriting or dropping an entry breaks every link
//! after it. The first entry links to [`GENESIS_HASH`].

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{
    asset::Asset,
    enums::{AuditAction, EntityType},
    loan::Loan,
    maintenance::Maintenance,
    mutation::Mutation,
    user::User,
};
use crate::error::{AppError, AppResult};

/// Predecessor hash of the first ledger entry
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Immutable audit ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    /// Position in the ledger, starting at 1 with no gaps
    pub seq: i64,
    /// Acting user, `None` for system actions
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: Option<Uuid>,
    /// Serialized JSON snapshot of the change
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub prev_hash: String,
    pub hash: String,
}

impl AuditEntry {
    /// Recompute this entry's hash from its content
    pub fn expected_hash(&self) -> String {
        compute_hash(
            self.seq,
            &self.prev_hash,
            self.user_id,
            self.action,
            self.entity_type,
            self.entity_id,
            self.details.as_deref(),
            self.timestamp,
        )
    }
}

/// Audit entry joined with the actor's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub entry: AuditEntry,
    pub user_name: Option<String>,
}

/// Audit entry that has not yet been placed in the ledger
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
}

impl NewAuditEntry {
    pub fn new(user_id: Option<Uuid>, action: AuditAction, entity_type: EntityType) -> Self {
        Self {
            user_id,
            action,
            entity_type,
            entity_id: None,
            details: None,
        }
    }

    pub fn entity(mut self, id: Uuid) -> Self {
        self.entity_id = Some(id);
        self
    }

    pub fn details<T: Serialize + ?Sized>(mut self, payload: &T) -> AppResult<Self> {
        let json = serde_json::to_string(payload)
            .map_err(|e| AppError::Internal(format!("Failed to serialize audit details: {}", e)))?;
        self.details = Some(json);
        Ok(self)
    }

    pub fn login(user: &User) -> Self {
        Self::new(Some(user.id), AuditAction::Login, EntityType::User).entity(user.id)
    }

    pub fn asset_created(actor: Option<Uuid>, asset: &Asset) -> AppResult<Self> {
        Self::new(actor, AuditAction::Create, EntityType::Asset)
            .entity(asset.id)
            .details(asset)
    }

    pub fn asset_updated(actor: Option<Uuid>, old: &Asset, new: &Asset) -> AppResult<Self> {
        Self::new(actor, AuditAction::Update, EntityType::Asset)
            .entity(new.id)
            .details(&serde_json::json!({ "old": old, "new": new }))
    }

    pub fn asset_deleted(actor: Option<Uuid>, asset: &Asset) -> AppResult<Self> {
        Self::new(actor, AuditAction::Delete, EntityType::Asset)
            .entity(asset.id)
            .details(asset)
    }

    pub fn relocated(actor: Option<Uuid>, mutation: &Mutation) -> AppResult<Self> {
        Self::new(actor, AuditAction::Mutation, EntityType::Asset)
            .entity(mutation.asset_id)
            .details(mutation)
    }

    pub fn maintained(actor: Option<Uuid>, maintenance: &Maintenance) -> AppResult<Self> {
        Self::new(actor, AuditAction::Maintenance, EntityType::Asset)
            .entity(maintenance.asset_id)
            .details(maintenance)
    }

    pub fn loan_started(actor: Option<Uuid>, loan: &Loan) -> AppResult<Self> {
        Self::new(actor, AuditAction::LoanStart, EntityType::Loan)
            .entity(loan.id)
            .details(loan)
    }

    pub fn loan_returned(actor: Option<Uuid>, loan: &Loan) -> AppResult<Self> {
        Self::new(actor, AuditAction::LoanReturn, EntityType::Loan)
            .entity(loan.id)
            .details(loan)
    }

    /// Place the entry in the ledger after `prev_hash` at position `seq`.
    ///
    /// The timestamp is truncated to microseconds, the precision PostgreSQL
    /// stores, so the hash still verifies after a round trip.
    pub fn seal(self, seq: i64, prev_hash: &str, timestamp: DateTime<Utc>) -> AuditEntry {
        let timestamp = timestamp.trunc_subsecs(6);
        let hash = compute_hash(
            seq,
            prev_hash,
            self.user_id,
            self.action,
            self.entity_type,
            self.entity_id,
            self.details.as_deref(),
            timestamp,
        );

        AuditEntry {
            id: Uuid::new_v4(),
            seq,
            user_id: self.user_id,
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            details: self.details,
            timestamp,
            prev_hash: prev_hash.to_string(),
            hash,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn compute_hash(
    seq: i64,
    prev_hash: &str,
    user_id: Option<Uuid>,
    action: AuditAction,
    entity_type: EntityType,
    entity_id: Option<Uuid>,
    details: Option<&str>,
    timestamp: DateTime<Utc>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seq.to_be_bytes());
    hasher.update(prev_hash.as_bytes());
    for field in [
        user_id.map(|id| id.to_string()).unwrap_or_default(),
        action.as_str().to_string(),
        entity_type.as_str().to_string(),
        entity_id.map(|id| id.to_string()).unwrap_or_default(),
        timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
    ] {
        hasher.update([0x1f]);
        hasher.update(field.as_bytes());
    }
    hasher.update([0x1f]);
    if let Some(details) = details {
        hasher.update(details.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Result of walking the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerification {
    pub valid: bool,
    /// Number of entries checked before stopping
    pub checked: u64,
    /// Sequence number of the first entry that does not verify
    pub broken_at: Option<i64>,
}

/// Verify a ledger given in ascending `seq` order
pub fn verify_chain<'a>(entries: impl IntoIterator<Item = &'a AuditEntry>) -> ChainVerification {
    let mut expected_prev = GENESIS_HASH.to_string();
    let mut expected_seq = 1;
    let mut checked = 0;

    for entry in entries {
        checked += 1;
        if entry.seq != expected_seq
            || entry.prev_hash != expected_prev
            || entry.hash != entry.expected_hash()
        {
            return ChainVerification {
                valid: false,
                checked,
                broken_at: Some(entry.seq),
            };
        }
        expected_prev = entry.hash.clone();
        expected_seq += 1;
    }

    ChainVerification {
        valid: true,
        checked,
        broken_at: None,
    }
}

/// Audit log query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct AuditQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl AuditQuery {
    pub const MAX_PER_PAGE: i64 = 100;

    /// Clamped (page, per_page), both at least 1
    pub fn paging(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, Self::MAX_PER_PAGE);
        (page, per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(n: i64) -> Vec<AuditEntry> {
        let mut entries: Vec<AuditEntry> = Vec::new();
        for seq in 1..=n {
            let prev = entries
                .last()
                .map(|e| e.hash.clone())
                .unwrap_or_else(|| GENESIS_HASH.to_string());
            let entry = NewAuditEntry::new(None, AuditAction::Create, EntityType::Asset)
                .entity(Uuid::new_v4())
                .details(&serde_json::json!({ "n": seq }))
                .unwrap()
                .seal(seq, &prev, Utc::now());
            entries.push(entry);
        }
        entries
    }

    #[test]
    fn sealed_entries_verify() {
        let entries = ledger(5);
        let report = verify_chain(&entries);
        assert_eq!(
            report,
            ChainVerification {
                valid: true,
                checked: 5,
                broken_at: None
            }
        );
    }

    #[test]
    fn empty_ledger_is_valid() {
        let report = verify_chain(&[]);
        assert!(report.valid);
        assert_eq!(report.checked, 0);
    }

    #[test]
    fn edited_details_break_the_chain() {
        let mut entries = ledger(4);
        entries[2].details = Some("{\"n\":99}".to_string());
        let report = verify_chain(&entries);
        assert!(!report.valid);
        assert_eq!(report.broken_at, Some(3));
    }

    #[test]
    fn dropped_entry_breaks_the_chain() {
        let mut entries = ledger(4);
        entries.remove(1);
        let report = verify_chain(&entries);
        assert_eq!(report.broken_at, Some(3));
    }

    #[test]
    fn seal_truncates_to_microseconds() {
        let entry = NewAuditEntry::new(None, AuditAction::Login, EntityType::User).seal(
            1,
            GENESIS_HASH,
            Utc::now(),
        );
        assert_eq!(entry.timestamp.timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(entry.hash, entry.expected_hash());
    }

    #[test]
    fn paging_is_clamped() {
        let query = AuditQuery {
            page: Some(0),
            per_page: Some(1_000),
        };
        assert_eq!(query.paging(), (1, AuditQuery::MAX_PER_PAGE));
        assert_eq!(AuditQuery::default().paging(), (1, 20));
    }
}
