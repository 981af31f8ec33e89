//! Maintenance endpoint

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    authz::Operation,
    error::AppResult,
    models::maintenance::{CreateMaintenance, Maintenance},
    AppState,
};

use super::{AuthenticatedUser, JsonBody};

/// Record a routine service or repair
#[utoipa::path(
    post,
    path = "/maintenances",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    request_body = CreateMaintenance,
    responses(
        (status = 201, description = "Maintenance recorded", body = Maintenance),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn create_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: JsonBody<CreateMaintenance>,
) -> AppResult<(StatusCode, Json<Maintenance>)> {
    claims.authorize(Operation::RecordMaintenance)?;
    let request = body.into_valid()?;

    let maintenance = state.services.lifecycle.record_maintenance(claims.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(maintenance)))
}
