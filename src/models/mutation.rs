//! Location mutation (relocation) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::asset::not_blank;

/// One accepted relocation of an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    pub id: Uuid,
    pub asset_id: Uuid,
    /// Asset location at the instant the relocation was accepted
    pub from_location: String,
    pub to_location: String,
    pub description: String,
    pub user_id: Option<Uuid>,
    pub date: DateTime<Utc>,
}

/// Mutation joined with the acting user's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MutationWithUser {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub mutation: Mutation,
    pub user_name: Option<String>,
}

/// Relocation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMutation {
    pub asset_id: Uuid,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub to_location: String,
    /// Reason for the move
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
}

impl CreateMutation {
    /// Build the record for a move away from `from_location`
    pub fn to_mutation(&self, from_location: &str, actor: Option<Uuid>, now: DateTime<Utc>) -> Mutation {
        Mutation {
            id: Uuid::new_v4(),
            asset_id: self.asset_id,
            from_location: from_location.to_string(),
            to_location: self.to_location.clone(),
            description: self.description.clone(),
            user_id: actor,
            date: now,
        }
    }
}
