//! Session routes: current session, sign-out, and the caller's profile.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::{CurrentSession, MaybeSession};
use crate::models::user::{Profile, UpdateProfile};
use crate::services::profile as profile_service;
use crate::services::session::{self as session_service, Session};
use crate::AppState;

/// GET /api/v1/auth/session: the current session, or `null` when signed out.
pub async fn session(MaybeSession(session): MaybeSession) -> Json<ApiResponse<Option<Session>>> {
    ApiResponse::success(session)
}

/// POST /api/v1/auth/logout: revoke the presented token.
pub async fn logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    session_service::sign_out(state.store.as_ref(), &state.revocations, &session).await?;
    Ok(ApiResponse::success("Signed out successfully"))
}

/// GET /api/v1/profile: the caller's profile.
pub async fn me(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let profile = profile_service::load_profile(state.store.as_ref(), session.user_id).await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/v1/profile: edit name or phone.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(body): Json<UpdateProfile>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let profile =
        profile_service::update_profile(state.store.as_ref(), session.user_id, &body).await?;
    Ok(ApiResponse::success(profile))
}
