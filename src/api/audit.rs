//! Audit ledger endpoints

use axum::{extract::State, Json};

use crate::{
    authz::Operation,
    error::AppResult,
    models::audit::{AuditLogView, AuditQuery, ChainVerification},
    AppState,
};

use super::{ApiQuery, AuthenticatedUser, PaginatedResponse};

/// List audit entries, newest first
#[utoipa::path(
    get,
    path = "/audit-logs",
    tag = "audit",
    security(("bearer_auth" = [])),
    params(AuditQuery),
    responses(
        (status = 200, description = "One page of the audit ledger", body = PaginatedResponse<AuditLogView>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<AuditQuery>,
) -> AppResult<Json<PaginatedResponse<AuditLogView>>> {
    claims.authorize(Operation::ReadAuditLog)?;

    let (page, per_page) = query.paging();
    let (items, total) = state.services.audit.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// Verify the audit hash chain
#[utoipa::path(
    get,
    path = "/audit-logs/verify",
    tag = "audit",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Verification report", body = ChainVerification),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn verify_audit_chain(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ChainVerification>> {
    claims.authorize(Operation::VerifyAuditChain)?;

    let report = state.services.audit.verify().await?;
    Ok(Json(report))
}
