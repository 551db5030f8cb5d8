//! Session and identity extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::AppRole;
use crate::services::profile;
use crate::services::session::{self, Session};
use crate::AppState;

/// The caller's session if one is presented, `None` otherwise.
///
/// Never rejects for a missing or invalid token; it does reject when the
/// revocation list cannot be consulted.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());

        let resolved = session::resolve_session(
            token,
            &state.config.jwt_secret,
            &state.config.jwt_audience,
            &state.revocations,
        )
        .await?;
        Ok(MaybeSession(resolved))
    }
}

/// Authenticated session; rejects with 401 when there is none.
///
/// ```ignore
/// async fn handler(CurrentSession(session): CurrentSession) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeSession(session) = MaybeSession::from_request_parts(parts, state).await?;
        session.map(CurrentSession).ok_or(AppError::Unauthorized)
    }
}

/// Authenticated user with the single role assigned in `user_roles`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: AppRole,
    pub session: Session,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        let role = profile::load_role(state.store.as_ref(), session.user_id).await?;

        Ok(CurrentUser {
            id: session.user_id,
            role,
            session,
        })
    }
}
