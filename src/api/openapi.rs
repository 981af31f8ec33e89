//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, audit, auth, health, loans, maintenances, mutations, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asset Tracker API",
        version = "0.1.0",
        description = "IT asset lifecycle and audit trail REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::create_asset,
        assets::update_asset,
        assets::delete_asset,
        // Lifecycle
        mutations::create_mutation,
        maintenances::create_maintenance,
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::return_loan,
        // Reporting
        stats::get_stats,
        audit::list_audit_logs,
        audit::verify_audit_chain,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::UserInfo,
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::AssetSummary,
            crate::models::asset::AssetDetails,
            crate::models::asset::CreateAsset,
            crate::models::asset::UpdateAsset,
            crate::models::asset::ServiceReminder,
            crate::models::asset::StatusCount,
            crate::models::asset::CategoryCount,
            // Lifecycle
            crate::models::mutation::Mutation,
            crate::models::mutation::MutationWithUser,
            crate::models::mutation::CreateMutation,
            crate::models::maintenance::Maintenance,
            crate::models::maintenance::CreateMaintenance,
            crate::models::loan::Loan,
            crate::models::loan::CreateLoan,
            // Audit
            crate::models::audit::AuditEntry,
            crate::models::audit::AuditLogView,
            crate::models::audit::ChainVerification,
            // Enums
            crate::models::enums::AssetStatus,
            crate::models::enums::MaintenanceType,
            crate::models::enums::LoanStatus,
            crate::models::enums::AuditAction,
            crate::models::enums::EntityType,
            crate::models::enums::Role,
            // Stats
            stats::StatsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "assets", description = "Asset registry"),
        (name = "lifecycle", description = "Relocation and maintenance"),
        (name = "loans", description = "Loan cycle"),
        (name = "stats", description = "Dashboard statistics"),
        (name = "audit", description = "Audit ledger")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
