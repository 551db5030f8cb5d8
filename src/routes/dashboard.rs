//! Dashboard route: profile, role and role-scoped statistics.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentSession;
use crate::services::dashboard::{self, Dashboard};
use crate::AppState;

/// GET /api/v1/dashboard: everything the dashboard view renders.
pub async fn show(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ApiResponse<Dashboard>>, AppError> {
    let dashboard = dashboard::load_dashboard(
        state.store.as_ref(),
        session.user_id,
        state.config.stats_timeout(),
    )
    .await?;
    Ok(ApiResponse::success(dashboard))
}
