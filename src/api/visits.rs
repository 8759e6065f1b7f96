//! Visit endpoints

use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::visit::{
        CreateVisit, SuggestionField, SuggestionQuery, Suggestions, Visit, VisitQuery, VisitStats,
    },
};

use super::AuthenticatedUser;

/// List visits visible to the caller, filtered
#[utoipa::path(
    get,
    path = "/visits",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(VisitQuery),
    responses(
        (status = 200, description = "Visits in creation order", body = Vec<Visit>),
        (status = 400, description = "Invalid date bound"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_visits(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<VisitQuery>,
) -> AppResult<Json<Vec<Visit>>> {
    let criteria = query.into_criteria()?;
    let visits = state.services.visits.list(&claims, &criteria).await?;
    Ok(Json(visits))
}

/// Get visit details
#[utoipa::path(
    get,
    path = "/visits/{id}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visit details", body = Visit),
        (status = 404, description = "Visit not found")
    )
)]
pub async fn get_visit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Visit>> {
    let visit = state.services.visits.get(&claims, id).await?;
    Ok(Json(visit))
}

/// Log a new visit
#[utoipa::path(
    post,
    path = "/visits",
    tag = "visits",
    security(("bearer_auth" = [])),
    request_body = CreateVisit,
    responses(
        (status = 201, description = "Visit created", body = Visit),
        (status = 400, description = "Missing required field")
    )
)]
pub async fn create_visit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateVisit>,
) -> AppResult<(StatusCode, Json<Visit>)> {
    let visit = state.services.visits.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

#[derive(Serialize, ToSchema)]
pub struct ReplaceResponse {
    /// Number of visits now stored
    pub count: usize,
}

/// Replace the whole visit list (admin only)
#[utoipa::path(
    put,
    path = "/visits",
    tag = "visits",
    security(("bearer_auth" = [])),
    request_body = Vec<Visit>,
    responses(
        (status = 200, description = "Visit list replaced", body = ReplaceResponse),
        (status = 400, description = "Duplicate identifiers"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn replace_visits(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(visits): Json<Vec<Visit>>,
) -> AppResult<Json<ReplaceResponse>> {
    let count = state.services.visits.replace_all(&claims, visits).await?;
    Ok(Json(ReplaceResponse { count }))
}

/// Distinct vendors, clients and managers for autocomplete
#[utoipa::path(
    get,
    path = "/visits/suggestions",
    tag = "visits",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Suggestion sets", body = Suggestions)
    )
)]
pub async fn get_suggestions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Suggestions>> {
    let suggestions = state.services.visits.suggestions(&claims).await?;
    Ok(Json(suggestions))
}

/// Autocomplete candidates for one filter field
#[utoipa::path(
    get,
    path = "/visits/suggestions/{field}",
    tag = "visits",
    security(("bearer_auth" = [])),
    params(
        ("field" = SuggestionField, Path, description = "vendor, client or manager"),
        SuggestionQuery
    ),
    responses(
        (status = 200, description = "Matching values", body = Vec<String>),
        (status = 400, description = "Unknown suggestion field")
    )
)]
pub async fn narrow_suggestions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    field: Result<Path<SuggestionField>, PathRejection>,
    Query(query): Query<SuggestionQuery>,
) -> AppResult<Json<Vec<String>>> {
    let Path(field) = field.map_err(|_| {
        AppError::Validation("Suggestion field must be vendor, client or manager".to_string())
    })?;
    let typed = query.q.unwrap_or_default();
    let candidates = state
        .services
        .visits
        .narrow_suggestions(&claims, field, &typed)
        .await?;
    Ok(Json(candidates))
}

/// Visit counters for the dashboard cards
#[utoipa::path(
    get,
    path = "/visits/stats",
    tag = "visits",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visit counters", body = VisitStats)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<VisitStats>> {
    let stats = state.services.visits.stats(&claims).await?;
    Ok(Json(stats))
}
