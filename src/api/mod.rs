//! API handlers for the asset tracker REST endpoints

pub mod assets;
pub mod audit;
pub mod auth;
pub mod health;
pub mod loans;
pub mod maintenances;
pub mod mutations;
pub mod openapi;
pub mod stats;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use std::convert::Infallible;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Unauthorized".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Unauthorized".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Authentication("Invalid token".to_string())
        })?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON request body, parsed and checked against its `validator` rules.
///
/// The outcome is held until the handler calls [`JsonBody::into_valid`], so a
/// handler can consult the authorization gate before the body is looked at.
pub struct JsonBody<T>(AppResult<T>);

impl<T> JsonBody<T> {
    pub fn into_valid(self) -> AppResult<T> {
        self.0
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let parsed = match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => value.validate().map(|_| value).map_err(AppError::from),
            Err(rejection) => Err(AppError::from(rejection)),
        };
        Ok(JsonBody(parsed))
    }
}

/// Path parameters with rejections reported as [`AppError`]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}

/// Query string with rejections reported as [`AppError`]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub items: Vec<T>,
    /// Total number of entries
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub per_page: i64,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Assets
        .route("/assets", get(assets::list_assets).post(assets::create_asset))
        .route(
            "/assets/:id",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        // Lifecycle
        .route("/mutations", post(mutations::create_mutation))
        .route("/maintenances", post(maintenances::create_maintenance))
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/:id", get(loans::get_loan))
        .route("/loans/:id/return", post(loans::return_loan))
        // Reporting
        .route("/stats", get(stats::get_stats))
        .route("/audit-logs", get(audit::list_audit_logs))
        .route("/audit-logs/verify", get(audit::verify_audit_chain))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
