//! Assets and their history on PostgreSQL

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use super::{audit::append_entry, is_unique_violation, PgRepository};
use crate::{
    error::{AppError, AppResult},
    lifecycle,
    models::{
        asset::{Asset, AssetDetails, AssetSummary, CategoryCount, CreateAsset, ServiceReminder, StatusCount, UpdateAsset},
        audit::NewAuditEntry,
        enums::LoanStatus,
        loan::Loan,
        maintenance::{CreateMaintenance, Maintenance},
        mutation::{CreateMutation, Mutation, MutationWithUser},
    },
    repository::{now, AssetsRepository},
};

/// Read an asset and hold its row lock until the transaction ends
async fn lock_asset(conn: &mut PgConnection, id: Uuid) -> AppResult<Asset> {
    sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| lifecycle::asset_not_found(id))
}

#[async_trait]
impl AssetsRepository for PgRepository {
    async fn assets_list(&self) -> AppResult<Vec<AssetSummary>> {
        let assets = sqlx::query_as::<_, Asset>("SELECT * FROM assets ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await?;

        let mut latest: HashMap<Uuid, Mutation> = sqlx::query_as::<_, Mutation>(
            "SELECT DISTINCT ON (asset_id) * FROM mutations ORDER BY asset_id, date DESC",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|m| (m.asset_id, m))
        .collect();

        Ok(assets
            .into_iter()
            .map(|asset| AssetSummary {
                latest_mutation: latest.remove(&asset.id),
                asset,
            })
            .collect())
    }

    async fn assets_get_by_id(&self, id: Uuid) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| lifecycle::asset_not_found(id))
    }

    async fn assets_get_details(&self, id: Uuid) -> AppResult<AssetDetails> {
        let asset = self.assets_get_by_id(id).await?;

        let mutations = sqlx::query_as::<_, MutationWithUser>(
            r#"
            SELECT m.*, u.name AS user_name
            FROM mutations m
            LEFT JOIN users u ON u.id = m.user_id
            WHERE m.asset_id = $1
            ORDER BY m.date DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let maintenances = sqlx::query_as::<_, Maintenance>(
            "SELECT * FROM maintenances WHERE asset_id = $1 ORDER BY date DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE asset_id = $1 ORDER BY loan_date DESC")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(AssetDetails {
            asset,
            mutations,
            maintenances,
            loans,
        })
    }

    async fn assets_create(&self, actor: Option<Uuid>, data: &CreateAsset) -> AppResult<Asset> {
        let at = now();
        let asset = data.to_asset(Uuid::new_v4(), at);
        lifecycle::ensure_initial_status(asset.status)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO assets (
                id, code, name, category, brand, model, serial_number, condition, price,
                purchase_date, description, image_url, location, status, next_service_date,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(asset.id)
        .bind(&asset.code)
        .bind(&asset.name)
        .bind(&asset.category)
        .bind(&asset.brand)
        .bind(&asset.model)
        .bind(&asset.serial_number)
        .bind(&asset.condition)
        .bind(asset.price)
        .bind(asset.purchase_date)
        .bind(&asset.description)
        .bind(&asset.image_url)
        .bind(&asset.location)
        .bind(asset.status)
        .bind(asset.next_service_date)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Asset with code {} already exists", asset.code))
            } else {
                AppError::Database(e)
            }
        })?;

        append_entry(&mut tx, NewAuditEntry::asset_created(actor, &asset)?, at).await?;
        tx.commit().await?;
        Ok(asset)
    }

    async fn assets_update(&self, actor: Option<Uuid>, id: Uuid, data: &UpdateAsset) -> AppResult<Asset> {
        let at = now();
        let mut tx = self.pool.begin().await?;
        let old = lock_asset(&mut tx, id).await?;
        lifecycle::ensure_operator_status_change(old.status, data.status)?;

        let updated = data.apply_to(&old, at);
        sqlx::query(
            r#"
            UPDATE assets SET
                name = $2, category = $3, brand = $4, model = $5, serial_number = $6,
                condition = $7, price = $8, purchase_date = $9, description = $10,
                image_url = $11, status = $12, next_service_date = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&updated.name)
        .bind(&updated.category)
        .bind(&updated.brand)
        .bind(&updated.model)
        .bind(&updated.serial_number)
        .bind(&updated.condition)
        .bind(updated.price)
        .bind(updated.purchase_date)
        .bind(&updated.description)
        .bind(&updated.image_url)
        .bind(updated.status)
        .bind(updated.next_service_date)
        .bind(updated.updated_at)
        .execute(&mut *tx)
        .await?;

        append_entry(&mut tx, NewAuditEntry::asset_updated(actor, &old, &updated)?, at).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn assets_delete(&self, actor: Option<Uuid>, id: Uuid) -> AppResult<()> {
        let at = now();
        let mut tx = self.pool.begin().await?;
        let asset = lock_asset(&mut tx, id).await?;

        let has_active_loan: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE asset_id = $1 AND status = $2)")
                .bind(id)
                .bind(LoanStatus::Active)
                .fetch_one(&mut *tx)
                .await?;
        lifecycle::ensure_deletable(has_active_loan)?;

        append_entry(&mut tx, NewAuditEntry::asset_deleted(actor, &asset)?, at).await?;
        // mutations, maintenances and loans go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn assets_relocate(&self, actor: Option<Uuid>, data: &CreateMutation) -> AppResult<Mutation> {
        let at = now();
        let mut tx = self.pool.begin().await?;
        let asset = lock_asset(&mut tx, data.asset_id).await?;
        let mutation = data.to_mutation(&asset.location, actor, at);

        sqlx::query(
            r#"
            INSERT INTO mutations (id, asset_id, from_location, to_location, description, user_id, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(mutation.id)
        .bind(mutation.asset_id)
        .bind(&mutation.from_location)
        .bind(&mutation.to_location)
        .bind(&mutation.description)
        .bind(mutation.user_id)
        .bind(mutation.date)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE assets SET location = $2, updated_at = $3 WHERE id = $1")
            .bind(asset.id)
            .bind(&mutation.to_location)
            .bind(at)
            .execute(&mut *tx)
            .await?;

        append_entry(&mut tx, NewAuditEntry::relocated(actor, &mutation)?, at).await?;
        tx.commit().await?;
        Ok(mutation)
    }

    async fn assets_record_maintenance(
        &self,
        actor: Option<Uuid>,
        data: &CreateMaintenance,
    ) -> AppResult<Maintenance> {
        let at = now();
        let mut tx = self.pool.begin().await?;
        lock_asset(&mut tx, data.asset_id).await?;
        let maintenance = data.to_maintenance(actor, at);

        sqlx::query(
            r#"
            INSERT INTO maintenances (id, asset_id, maintenance_type, cost, description, performed_by, user_id, date, next_service_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(maintenance.id)
        .bind(maintenance.asset_id)
        .bind(maintenance.maintenance_type)
        .bind(maintenance.cost)
        .bind(&maintenance.description)
        .bind(&maintenance.performed_by)
        .bind(maintenance.user_id)
        .bind(maintenance.date)
        .bind(maintenance.next_service_date)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE assets
            SET next_service_date = COALESCE($2, next_service_date), updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(maintenance.asset_id)
        .bind(maintenance.next_service_date)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        append_entry(&mut tx, NewAuditEntry::maintained(actor, &maintenance)?, at).await?;
        tx.commit().await?;
        Ok(maintenance)
    }

    async fn assets_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn assets_count_by_status(&self) -> AppResult<Vec<StatusCount>> {
        let counts = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM assets GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn assets_count_by_category(&self) -> AppResult<Vec<CategoryCount>> {
        let counts = sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM assets GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn assets_service_due(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Vec<ServiceReminder>> {
        let due = sqlx::query_as::<_, ServiceReminder>(
            r#"
            SELECT id, code, name, location, next_service_date
            FROM assets
            WHERE next_service_date BETWEEN $1 AND $2
            ORDER BY next_service_date
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        Ok(due)
    }
}
