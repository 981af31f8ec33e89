//! Loan cycle endpoints

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    authz::Operation,
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanQuery},
    AppState,
};

use super::{ApiPath, ApiQuery, AuthenticatedUser, JsonBody};

/// List loans, newest first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans", body = Vec<Loan>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<LoanQuery>,
) -> AppResult<Json<Vec<Loan>>> {
    claims.authorize(Operation::ReadLoans)?;

    let loans = state.services.lifecycle.list_loans(query.status).await?;
    Ok(Json(loans))
}

/// Get a loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Loan>> {
    claims.authorize(Operation::ReadLoans)?;

    let loan = state.services.lifecycle.get_loan(id).await?;
    Ok(Json(loan))
}

/// Lend an available asset
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan started", body = Loan),
        (status = 400, description = "Asset is not available or input is invalid"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: JsonBody<CreateLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    claims.authorize(Operation::StartLoan)?;
    let request = body.into_valid()?;

    let loan = state.services.lifecycle.start_loan(claims.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a loaned asset
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan returned", body = Loan),
        (status = 400, description = "Loan does not exist or is not active")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Loan>> {
    claims.authorize(Operation::ReturnLoan)?;

    let loan = state.services.lifecycle.return_loan(claims.user_id, id).await?;
    Ok(Json(loan))
}
