//! Maintenance record model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    asset::{non_negative, not_blank},
    enums::MaintenanceType,
};

/// One serviced or repaired event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    pub id: Uuid,
    pub asset_id: Uuid,
    #[serde(rename = "type")]
    pub maintenance_type: MaintenanceType,
    pub cost: Decimal,
    pub description: String,
    /// Technician or vendor
    pub performed_by: String,
    pub user_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub next_service_date: Option<DateTime<Utc>>,
}

/// Record maintenance request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenance {
    pub asset_id: Uuid,
    #[serde(rename = "type")]
    pub maintenance_type: MaintenanceType,
    #[validate(custom(function = "non_negative"))]
    pub cost: Decimal,
    #[validate(custom(function = "not_blank"), length(max = 2000))]
    pub description: String,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub performed_by: String,
    /// When supplied, becomes the asset's next service date
    pub next_service_date: Option<DateTime<Utc>>,
}

impl CreateMaintenance {
    pub fn to_maintenance(&self, actor: Option<Uuid>, now: DateTime<Utc>) -> Maintenance {
        Maintenance {
            id: Uuid::new_v4(),
            asset_id: self.asset_id,
            maintenance_type: self.maintenance_type,
            cost: self.cost,
            description: self.description.clone(),
            performed_by: self.performed_by.clone(),
            user_id: actor,
            date: now,
            next_service_date: self.next_service_date,
        }
    }
}
