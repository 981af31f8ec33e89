//! Asset model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{
    enums::AssetStatus,
    loan::Loan,
    maintenance::Maintenance,
    mutation::{Mutation, MutationWithUser},
};

pub const DEFAULT_CONDITION: &str = "GOOD";

/// Asset record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    /// Human-readable inventory code, immutable once issued
    pub code: String,
    pub name: String,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub condition: String,
    /// Acquisition price
    pub price: Option<Decimal>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location: String,
    pub status: AssetStatus,
    pub next_service_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Asset as shown in lists, with its most recent relocation only
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    #[serde(flatten)]
    pub asset: Asset,
    pub latest_mutation: Option<Mutation>,
}

/// Asset with its full history, newest first
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
    #[serde(flatten)]
    pub asset: Asset,
    pub mutations: Vec<MutationWithUser>,
    pub maintenances: Vec<Maintenance>,
    pub loans: Vec<Loan>,
}

/// Asset due for service, for dashboard reminders
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReminder {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub location: String,
    pub next_service_date: DateTime<Utc>,
}

/// Asset count for one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StatusCount {
    pub status: AssetStatus,
    pub count: i64,
}

/// Asset count for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Create (register) asset request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    #[validate(custom(function = "not_blank"), length(max = 64, message = "Code must be at most 64 characters"))]
    pub code: String,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: String,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    /// Defaults to "GOOD"
    pub condition: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub price: Option<Decimal>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub location: String,
    /// Initial status, defaults to AVAILABLE; LOANED is refused
    pub status: Option<AssetStatus>,
    pub next_service_date: Option<DateTime<Utc>>,
}

impl CreateAsset {
    /// Build the asset record this request registers
    pub fn to_asset(&self, id: Uuid, now: DateTime<Utc>) -> Asset {
        Asset {
            id,
            code: self.code.trim().to_string(),
            name: self.name.clone(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            serial_number: self.serial_number.clone(),
            condition: self.condition.clone().unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
            price: self.price,
            purchase_date: self.purchase_date,
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            location: self.location.clone(),
            status: self.status.unwrap_or_default(),
            next_service_date: self.next_service_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update asset request: descriptive fields plus operator-set status.
///
/// `code` and `location` are deliberately absent; relocation goes through
/// the mutation endpoint.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAsset {
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub condition: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub price: Option<Decimal>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<AssetStatus>,
    pub next_service_date: Option<DateTime<Utc>>,
}

impl UpdateAsset {
    /// Apply the requested changes to a copy of `asset`
    pub fn apply_to(&self, asset: &Asset, now: DateTime<Utc>) -> Asset {
        let mut updated = asset.clone();

        macro_rules! set_field {
            ($field:ident) => {
                if let Some(ref val) = self.$field {
                    updated.$field = val.clone();
                }
            };
            (opt $field:ident) => {
                if let Some(ref val) = self.$field {
                    updated.$field = Some(val.clone());
                }
            };
        }

        set_field!(name);
        set_field!(category);
        set_field!(opt brand);
        set_field!(opt model);
        set_field!(opt serial_number);
        set_field!(condition);
        set_field!(opt price);
        set_field!(opt purchase_date);
        set_field!(opt description);
        set_field!(opt image_url);
        set_field!(status);
        set_field!(opt next_service_date);

        updated.updated_at = now;
        updated
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}
