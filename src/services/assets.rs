//! Asset registry service

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    lifecycle,
    models::{
        asset::{Asset, AssetDetails, AssetSummary, CreateAsset, UpdateAsset},
        enums::AssetStatus,
    },
    repository::{AssetsRepository, Repository},
};

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
}

impl AssetsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<AssetSummary>> {
        self.repository.assets_list().await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<AssetDetails> {
        self.repository.assets_get_details(id).await
    }

    pub async fn create(&self, actor: Uuid, data: CreateAsset) -> AppResult<Asset> {
        if let Some(status) = data.status {
            lifecycle::ensure_initial_status(status)?;
        }
        let asset = self.repository.assets_create(Some(actor), &data).await?;
        tracing::info!(asset_id = %asset.id, code = %asset.code, "Asset registered");
        Ok(asset)
    }

    pub async fn update(&self, actor: Uuid, id: Uuid, data: UpdateAsset) -> AppResult<Asset> {
        let asset = self.repository.assets_update(Some(actor), id, &data).await?;
        tracing::info!(asset_id = %asset.id, status = %asset.status, "Asset updated");
        Ok(asset)
    }

    pub async fn delete(&self, actor: Uuid, id: Uuid) -> AppResult<()> {
        self.repository.assets_delete(Some(actor), id).await?;
        tracing::info!(asset_id = %id, "Asset deleted");
        Ok(())
    }

    /// Register the sample assets whose codes are not taken yet.
    ///
    /// Returns how many were created; running it again creates none.
    pub async fn seed_samples(&self, actor: Option<Uuid>) -> AppResult<usize> {
        let mut created = 0;
        for sample in sample_assets() {
            match self.repository.assets_create(actor, &sample).await {
                Ok(asset) => {
                    tracing::debug!(code = %asset.code, "Sample asset registered");
                    created += 1;
                }
                Err(AppError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }
}

fn sample(code: &str, name: &str, category: &str, brand: &str, model: &str, serial: &str, location: &str) -> CreateAsset {
    CreateAsset {
        code: code.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        brand: Some(brand.to_string()),
        model: Some(model.to_string()),
        serial_number: Some(serial.to_string()),
        condition: None,
        price: None,
        purchase_date: None,
        description: None,
        image_url: None,
        location: location.to_string(),
        status: None,
        next_service_date: None,
    }
}

fn sample_assets() -> Vec<CreateAsset> {
    vec![
        CreateAsset {
            status: Some(AssetStatus::InUse),
            price: Some(Decimal::new(150_000_000, 0)),
            ..sample("TIK-2024-001", "Server Utama", "Server", "Dell", "PowerEdge R740", "DELL-740-XYZ", "Data Center Lt. 2")
        },
        CreateAsset {
            status: Some(AssetStatus::InUse),
            price: Some(Decimal::new(35_000_000, 0)),
            ..sample("TIK-2024-002", "Laptop Kerja", "Laptop", "Apple", "MacBook Pro M3", "APPLE-M3-001", "Ruang Kepala Dinas")
        },
        CreateAsset {
            status: Some(AssetStatus::Available),
            price: Some(Decimal::new(85_000_000, 0)),
            ..sample("TIK-2024-003", "Router Core Backbone", "Router", "Cisco", "ASR 1001-X", "CISCO-ASR-999", "Gudang TIK")
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::{memory::MemoryRepository, AuditRepository};

    #[tokio::test]
    async fn seeding_registers_samples_once() {
        let repo = Arc::new(MemoryRepository::new());
        let assets = AssetsService::new(repo.clone());

        assert_eq!(assets.seed_samples(None).await.unwrap(), 3);
        assert_eq!(assets.seed_samples(None).await.unwrap(), 0);

        let listed = assets.list().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(repo.audit_ledger().await.unwrap().len(), 3);
    }
}
