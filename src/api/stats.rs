//! Dashboard statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    authz::Operation,
    error::AppResult,
    models::{
        asset::{CategoryCount, ServiceReminder, StatusCount},
        audit::AuditLogView,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Statistics response
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_assets: i64,
    pub assets_by_status: Vec<StatusCount>,
    pub assets_by_category: Vec<CategoryCount>,
    /// Newest audit entries with actor names
    pub recent_logs: Vec<AuditLogView>,
    /// Assets due for service within the reminder window, soonest first
    pub reminders: Vec<ServiceReminder>,
}

/// Get dashboard statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = StatsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.authorize(Operation::ReadStats)?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
