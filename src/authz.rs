//! Authorization gate.
//!
//! A static capability table mapping each operation to the roles allowed to
//! perform it. Handlers consult it before calling into any service, so a
//! denied request never reaches the store.

use serde::Serialize;

use crate::{error::AppError, models::enums::Role};

/// Operations guarded by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    ReadAssets,
    ReadStats,
    ReadLoans,
    ReadAuditLog,
    CreateAsset,
    UpdateAsset,
    DeleteAsset,
    Relocate,
    RecordMaintenance,
    StartLoan,
    ReturnLoan,
    VerifyAuditChain,
}

const ANY_ROLE: &[Role] = &[Role::Admin, Role::Operator, Role::Viewer];
const STAFF: &[Role] = &[Role::Admin, Role::Operator];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Operation::ReadAssets,
        Operation::ReadStats,
        Operation::ReadLoans,
        Operation::ReadAuditLog,
        Operation::CreateAsset,
        Operation::UpdateAsset,
        Operation::DeleteAsset,
        Operation::Relocate,
        Operation::RecordMaintenance,
        Operation::StartLoan,
        Operation::ReturnLoan,
        Operation::VerifyAuditChain,
    ];

    /// Roles allowed to perform this operation
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Operation::ReadAssets
            | Operation::ReadStats
            | Operation::ReadLoans
            | Operation::ReadAuditLog => ANY_ROLE,
            Operation::CreateAsset
            | Operation::UpdateAsset
            | Operation::Relocate
            | Operation::RecordMaintenance
            | Operation::StartLoan
            | Operation::ReturnLoan => STAFF,
            Operation::DeleteAsset | Operation::VerifyAuditChain => ADMIN_ONLY,
        }
    }
}

pub fn is_allowed(role: Role, operation: Operation) -> bool {
    operation.allowed_roles().contains(&role)
}

/// Allow or reject `role` for `operation`
pub fn authorize(role: Role, operation: Operation) -> Result<(), AppError> {
    if is_allowed(role, operation) {
        Ok(())
    } else {
        tracing::debug!(?role, ?operation, "authorization denied");
        Err(AppError::Authorization("Forbidden".to_string()))
    }
}
