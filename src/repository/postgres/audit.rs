//! Audit ledger on PostgreSQL

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use super::PgRepository;
use crate::{
    error::AppResult,
    models::audit::{AuditEntry, AuditLogView, NewAuditEntry, GENESIS_HASH},
    repository::{now, page_offset, AuditRepository},
};

/// Advisory lock serializing ledger appends across connections
const AUDIT_APPEND_LOCK: i64 = 0x4155_4449_5400;

/// Append `entry` to the ledger on the caller's transaction.
///
/// The advisory lock is released when that transaction ends, so the read of
/// the ledger head and the insert after it cannot interleave with another
/// append.
pub(super) async fn append_entry(
    conn: &mut PgConnection,
    entry: NewAuditEntry,
    at: DateTime<Utc>,
) -> AppResult<AuditEntry> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(AUDIT_APPEND_LOCK)
        .execute(&mut *conn)
        .await?;

    let head: Option<(i64, String)> =
        sqlx::query_as("SELECT seq, hash FROM audit_logs ORDER BY seq DESC LIMIT 1")
            .fetch_optional(&mut *conn)
            .await?;
    let (seq, prev_hash) = match head {
        Some((seq, hash)) => (seq + 1, hash),
        None => (1, GENESIS_HASH.to_string()),
    };

    let sealed = entry.seal(seq, &prev_hash, at);
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, seq, user_id, action, entity_type, entity_id, details, timestamp, prev_hash, hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(sealed.id)
    .bind(sealed.seq)
    .bind(sealed.user_id)
    .bind(sealed.action)
    .bind(sealed.entity_type)
    .bind(sealed.entity_id)
    .bind(&sealed.details)
    .bind(sealed.timestamp)
    .bind(&sealed.prev_hash)
    .bind(&sealed.hash)
    .execute(&mut *conn)
    .await?;

    Ok(sealed)
}

#[async_trait]
impl AuditRepository for PgRepository {
    async fn audit_record(&self, entry: NewAuditEntry) -> AppResult<AuditEntry> {
        let mut tx = self.pool.begin().await?;
        let sealed = append_entry(&mut tx, entry, now()).await?;
        tx.commit().await?;
        Ok(sealed)
    }

    async fn audit_list(&self, page: i64, per_page: i64) -> AppResult<(Vec<AuditLogView>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, AuditLogView>(
            r#"
            SELECT a.*, u.name AS user_name
            FROM audit_logs a
            LEFT JOIN users u ON u.id = a.user_id
            ORDER BY a.seq DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind(page_offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }

    async fn audit_ledger(&self) -> AppResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>("SELECT * FROM audit_logs ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}
