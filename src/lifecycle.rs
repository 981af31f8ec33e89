//! Asset lifecycle rules.
//!
//! Only `AVAILABLE -> LOANED` (start loan) and `LOANED -> AVAILABLE`
//! (return) are driven by the machine. The other statuses are set by staff
//! through the asset update, which must never enter or leave `LOANED`.
//! Both store implementations run these checks inside their atomic unit.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{enums::AssetStatus, loan::Loan, Asset},
};

pub const ASSET_NOT_AVAILABLE: &str = "Asset is not available";
pub const LOAN_NOT_ACTIVE: &str = "Loan is not active";

pub fn asset_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Asset with id {} not found", id))
}

pub fn loan_not_found(id: Uuid) -> AppError {
    AppError::InvalidState(format!("Loan with id {} does not exist", id))
}

/// A loan may start only on an available asset
pub fn ensure_loanable(asset: &Asset) -> AppResult<()> {
    if asset.status == AssetStatus::Available {
        Ok(())
    } else {
        Err(AppError::InvalidState(ASSET_NOT_AVAILABLE.to_string()))
    }
}

/// A loan may be returned exactly once
pub fn ensure_returnable(loan: &Loan) -> AppResult<()> {
    if loan.is_active() {
        Ok(())
    } else {
        Err(AppError::InvalidState(LOAN_NOT_ACTIVE.to_string()))
    }
}

/// Registration cannot claim a loan that does not exist
pub fn ensure_initial_status(status: AssetStatus) -> AppResult<()> {
    if status == AssetStatus::Loaned {
        return Err(AppError::InvalidState(
            "Assets cannot be registered as LOANED; start a loan instead".to_string(),
        ));
    }
    Ok(())
}

/// Check a staff-requested status change made through the asset update
pub fn ensure_operator_status_change(current: AssetStatus, requested: Option<AssetStatus>) -> AppResult<()> {
    let Some(requested) = requested else {
        return Ok(());
    };
    if requested == current {
        return Ok(());
    }
    if requested == AssetStatus::Loaned {
        return Err(AppError::InvalidState(
            "Status LOANED is only set by starting a loan".to_string(),
        ));
    }
    if current == AssetStatus::Loaned {
        return Err(AppError::InvalidState(
            "Asset is on loan; return the loan before changing its status".to_string(),
        ));
    }
    Ok(())
}

/// Assets with an active loan are never deleted
pub fn ensure_deletable(has_active_loan: bool) -> AppResult<()> {
    if has_active_loan {
        return Err(AppError::InvalidState(
            "Asset has an active loan and cannot be deleted".to_string(),
        ));
    }
    Ok(())
}
