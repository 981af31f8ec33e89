//! Asset registry endpoints

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    authz::Operation,
    error::AppResult,
    models::asset::{Asset, AssetDetails, AssetSummary, CreateAsset, UpdateAsset},
    AppState,
};

use super::{ApiPath, AuthenticatedUser, JsonBody};

/// List assets, most recently updated first
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All assets with their latest mutation", body = Vec<AssetSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_assets(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AssetSummary>>> {
    claims.authorize(Operation::ReadAssets)?;

    let assets = state.services.assets.list().await?;
    Ok(Json(assets))
}

/// Get asset with its mutation, maintenance and loan history
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset details", body = AssetDetails),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<AssetDetails>> {
    claims.authorize(Operation::ReadAssets)?;

    let asset = state.services.assets.get(id).await?;
    Ok(Json(asset))
}

/// Register a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset registered", body = Asset),
        (status = 400, description = "Invalid input or status"),
        (status = 403, description = "Role may not register assets"),
        (status = 409, description = "Asset code already exists")
    )
)]
pub async fn create_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: JsonBody<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    claims.authorize(Operation::CreateAsset)?;
    let request = body.into_valid()?;

    let asset = state.services.assets.create(claims.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Update descriptive fields and operator-set status
#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 400, description = "Invalid input or status change"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn update_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
    body: JsonBody<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    claims.authorize(Operation::UpdateAsset)?;
    let request = body.into_valid()?;

    let asset = state.services.assets.update(claims.user_id, id, request).await?;
    Ok(Json(asset))
}

/// Delete an asset and its history
#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 400, description = "Asset is on loan"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<StatusCode> {
    claims.authorize(Operation::DeleteAsset)?;

    state.services.assets.delete(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
