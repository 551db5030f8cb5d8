//! Institution registry and performance score routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentSession;
use crate::models::institution::{
    Institution, InstitutionFilters, PerformanceScore, RankedInstitution,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::institution::{self as institution_service, RankingQuery};
use crate::AppState;

/// GET /api/v1/institutions: list institutions with filters and pagination.
pub async fn list(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<InstitutionFilters>,
) -> Result<Json<ApiResponse<PagedResult<Institution>>>, AppError> {
    let result = institution_service::list(state.store.as_ref(), &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/institutions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _session: CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Institution>>, AppError> {
    let institution = institution_service::find_by_id(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(institution))
}

/// GET /api/v1/institutions/{id}/scores: yearly performance scores.
pub async fn scores(
    State(state): State<AppState>,
    _session: CurrentSession,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PerformanceScore>>>, AppError> {
    let scores = institution_service::scores(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(scores))
}

/// GET /api/v1/rankings?year=Y: ranked institutions for a year.
pub async fn rankings(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<RankingQuery>,
) -> Result<Json<ApiResponse<Vec<RankedInstitution>>>, AppError> {
    let rows = institution_service::rankings(state.store.as_ref(), &query).await?;
    Ok(ApiResponse::success(rows))
}
