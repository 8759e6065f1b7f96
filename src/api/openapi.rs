//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, health, visits};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sales Visits API",
        version = "0.3.0",
        description = "Commercial visit log REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Visits
        visits::list_visits,
        visits::get_visit,
        visits::create_visit,
        visits::replace_visits,
        visits::get_suggestions,
        visits::narrow_suggestions,
        visits::get_stats,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::LoginRequest,
            crate::models::user::UserProfile,
            crate::models::user::Role,
            auth::LoginResponse,
            // Visits
            crate::models::visit::Visit,
            crate::models::visit::VisitType,
            crate::models::visit::VisitStatus,
            crate::models::visit::VisitDetails,
            crate::models::visit::CreateVisit,
            crate::models::visit::SuggestionField,
            crate::models::visit::Suggestions,
            crate::models::visit::VisitStats,
            visits::ReplaceResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "visits", description = "Visit log, filters and autocomplete")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
