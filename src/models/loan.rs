//! Loan (borrow cycle) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{asset::not_blank, enums::LoanStatus};

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub borrower_name: String,
    pub borrower_dept: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }
}

/// Start loan request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoan {
    pub asset_id: Uuid,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub borrower_name: String,
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub borrower_dept: String,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl CreateLoan {
    /// Build the ACTIVE loan this request opens
    pub fn to_loan(&self, actor: Option<Uuid>, now: DateTime<Utc>) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            asset_id: self.asset_id,
            borrower_name: self.borrower_name.clone(),
            borrower_dept: self.borrower_dept.clone(),
            loan_date: now,
            due_date: self.due_date,
            return_date: None,
            status: LoanStatus::Active,
            user_id: actor,
            notes: self.notes.clone(),
        }
    }
}

/// Loan list filter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub status: Option<LoanStatus>,
}
