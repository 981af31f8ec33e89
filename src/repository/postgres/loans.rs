//! Loan cycle on PostgreSQL
//!
//! Both transitions are conditional updates: the row only changes when it is
//! still in the expected status, so two concurrent requests cannot both win.

use async_trait::async_trait;
use uuid::Uuid;

use super::{audit::append_entry, is_unique_violation, PgRepository};
use crate::{
    error::{AppError, AppResult},
    lifecycle,
    models::{
        audit::NewAuditEntry,
        enums::{AssetStatus, LoanStatus},
        loan::{CreateLoan, Loan},
    },
    repository::{now, LoansRepository},
};

#[async_trait]
impl LoansRepository for PgRepository {
    async fn loans_start(&self, actor: Option<Uuid>, data: &CreateLoan) -> AppResult<Loan> {
        let at = now();
        let mut tx = self.pool.begin().await?;

        let claimed: Option<Uuid> = sqlx::query_scalar(
            "UPDATE assets SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4 RETURNING id",
        )
        .bind(data.asset_id)
        .bind(AssetStatus::Loaned)
        .bind(at)
        .bind(AssetStatus::Available)
        .fetch_optional(&mut *tx)
        .await?;

        if claimed.is_none() {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM assets WHERE id = $1)")
                .bind(data.asset_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(if exists {
                AppError::InvalidState(lifecycle::ASSET_NOT_AVAILABLE.to_string())
            } else {
                lifecycle::asset_not_found(data.asset_id)
            });
        }

        let loan = data.to_loan(actor, at);
        sqlx::query(
            r#"
            INSERT INTO loans (id, asset_id, borrower_name, borrower_dept, loan_date, due_date, return_date, status, user_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(loan.id)
        .bind(loan.asset_id)
        .bind(&loan.borrower_name)
        .bind(&loan.borrower_dept)
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.status)
        .bind(loan.user_id)
        .bind(&loan.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // partial unique index on active loans
            if is_unique_violation(&e) {
                AppError::InvalidState(lifecycle::ASSET_NOT_AVAILABLE.to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        append_entry(&mut tx, NewAuditEntry::loan_started(actor, &loan)?, at).await?;
        tx.commit().await?;
        Ok(loan)
    }

    async fn loans_return(&self, actor: Option<Uuid>, loan_id: Uuid) -> AppResult<Loan> {
        let at = now();
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $2, return_date = $3 WHERE id = $1 AND status = $4 RETURNING *",
        )
        .bind(loan_id)
        .bind(LoanStatus::Returned)
        .bind(at)
        .bind(LoanStatus::Active)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(loan) = loan else {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE id = $1)")
                .bind(loan_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(if exists {
                AppError::InvalidState(lifecycle::LOAN_NOT_ACTIVE.to_string())
            } else {
                lifecycle::loan_not_found(loan_id)
            });
        };

        sqlx::query("UPDATE assets SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(loan.asset_id)
            .bind(AssetStatus::Available)
            .bind(at)
            .execute(&mut *tx)
            .await?;

        append_entry(&mut tx, NewAuditEntry::loan_returned(actor, &loan)?, at).await?;
        tx.commit().await?;
        Ok(loan)
    }

    async fn loans_get_by_id(&self, id: Uuid) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    async fn loans_list(&self, status: Option<LoanStatus>) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE ($1::text IS NULL OR status = $1) ORDER BY loan_date DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }
}
