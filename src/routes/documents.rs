//! Document routes: registration, listing, review queue and status changes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireReviewer;
use crate::models::document::{CreateDocument, Document, DocumentFilters, DocumentStatus};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::documents as document_service;
use crate::services::lifecycle::{self, TransitionActor, TransitionRequest, TransitionResult};
use crate::AppState;

/// POST /api/v1/documents: register an uploaded file (institution accounts).
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateDocument>,
) -> Result<Json<ApiResponse<Document>>, AppError> {
    let document =
        document_service::register(state.store.as_ref(), user.id, user.role, &body).await?;
    Ok(ApiResponse::success(document))
}

/// GET /api/v1/documents: documents visible to the caller.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<DocumentFilters>,
) -> Result<Json<ApiResponse<PagedResult<Document>>>, AppError> {
    let page =
        document_service::list(state.store.as_ref(), user.id, user.role, &filters, &pagination)
            .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/documents/queue: documents awaiting a reviewer (reviewer+).
///
/// Defaults to `pending` when no status filter is given.
pub async fn queue(
    State(state): State<AppState>,
    RequireReviewer(reviewer): RequireReviewer,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<DocumentFilters>,
) -> Result<Json<ApiResponse<PagedResult<Document>>>, AppError> {
    let filters = DocumentFilters {
        status: Some(filters.status.unwrap_or(DocumentStatus::Pending)),
        ..filters
    };
    let page = document_service::list(
        state.store.as_ref(),
        reviewer.id,
        reviewer.role,
        &filters,
        &pagination,
    )
    .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/documents/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Document>>, AppError> {
    let document = document_service::get(state.store.as_ref(), user.id, user.role, id).await?;
    Ok(ApiResponse::success(document))
}

/// PATCH /api/v1/documents/{id}/status: move a document through review.
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<ApiResponse<TransitionResult>>, AppError> {
    let actor = TransitionActor {
        id: user.id,
        role: user.role,
    };
    let result = lifecycle::transition(state.store.as_ref(), id, &body, actor).await?;
    Ok(ApiResponse::success(result))
}
