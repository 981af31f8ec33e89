//! Lifecycle operations: relocation, loan cycle and maintenance

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LoanStatus,
        loan::{CreateLoan, Loan},
        maintenance::{CreateMaintenance, Maintenance},
        mutation::{CreateMutation, Mutation},
    },
    repository::{AssetsRepository, LoansRepository, Repository},
};

#[derive(Clone)]
pub struct LifecycleService {
    repository: Repository,
}

impl LifecycleService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Move an asset, recording where it came from
    pub async fn relocate(&self, actor: Uuid, data: CreateMutation) -> AppResult<Mutation> {
        let mutation = self.repository.assets_relocate(Some(actor), &data).await?;
        tracing::info!(
            asset_id = %mutation.asset_id,
            from = %mutation.from_location,
            to = %mutation.to_location,
            "Asset relocated"
        );
        Ok(mutation)
    }

    pub async fn start_loan(&self, actor: Uuid, data: CreateLoan) -> AppResult<Loan> {
        if let Some(due_date) = data.due_date {
            if due_date < Utc::now() {
                return Err(AppError::Validation("dueDate must not be in the past".to_string()));
            }
        }

        let loan = self.repository.loans_start(Some(actor), &data).await?;
        tracing::info!(loan_id = %loan.id, asset_id = %loan.asset_id, borrower = %loan.borrower_name, "Loan started");
        Ok(loan)
    }

    pub async fn return_loan(&self, actor: Uuid, loan_id: Uuid) -> AppResult<Loan> {
        let loan = self.repository.loans_return(Some(actor), loan_id).await?;
        tracing::info!(loan_id = %loan.id, asset_id = %loan.asset_id, "Loan returned");
        Ok(loan)
    }

    pub async fn record_maintenance(&self, actor: Uuid, data: CreateMaintenance) -> AppResult<Maintenance> {
        let maintenance = self.repository.assets_record_maintenance(Some(actor), &data).await?;
        tracing::info!(
            asset_id = %maintenance.asset_id,
            kind = %maintenance.maintenance_type,
            "Maintenance recorded"
        );
        Ok(maintenance)
    }

    pub async fn list_loans(&self, status: Option<LoanStatus>) -> AppResult<Vec<Loan>> {
        self.repository.loans_list(status).await
    }

    pub async fn get_loan(&self, id: Uuid) -> AppResult<Loan> {
        self.repository.loans_get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::{
        models::asset::CreateAsset,
        repository::{AssetsRepository, MemoryRepository},
    };

    #[tokio::test]
    async fn due_date_in_the_past_is_rejected() {
        let repo = Arc::new(MemoryRepository::new());
        let asset = repo
            .assets_create(
                None,
                &CreateAsset {
                    code: "PRJ-01".to_string(),
                    name: "Projector".to_string(),
                    category: "Projector".to_string(),
                    brand: None,
                    model: None,
                    serial_number: None,
                    condition: None,
                    price: None,
                    purchase_date: None,
                    description: None,
                    image_url: None,
                    location: "Meeting Room".to_string(),
                    status: None,
                    next_service_date: None,
                },
            )
            .await
            .unwrap();
        let service = LifecycleService::new(repo.clone());

        let mut request = CreateLoan {
            asset_id: asset.id,
            borrower_name: "Sari".to_string(),
            borrower_dept: "HR".to_string(),
            due_date: Some(Utc::now() - Duration::days(1)),
            notes: None,
        };
        let err = service.start_loan(Uuid::new_v4(), request.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(service.list_loans(None).await.unwrap().is_empty());

        request.due_date = Some(Utc::now() + Duration::days(7));
        let loan = service.start_loan(Uuid::new_v4(), request).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Active);
    }
}
