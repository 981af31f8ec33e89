//! Relocation endpoint

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    authz::Operation,
    error::AppResult,
    models::mutation::{CreateMutation, Mutation},
    AppState,
};

use super::{AuthenticatedUser, JsonBody};

/// Move an asset to a new location
#[utoipa::path(
    post,
    path = "/mutations",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    request_body = CreateMutation,
    responses(
        (status = 201, description = "Mutation recorded", body = Mutation),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn create_mutation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: JsonBody<CreateMutation>,
) -> AppResult<(StatusCode, Json<Mutation>)> {
    claims.authorize(Operation::Relocate)?;
    let request = body.into_valid()?;

    let mutation = state.services.lifecycle.relocate(claims.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(mutation)))
}
