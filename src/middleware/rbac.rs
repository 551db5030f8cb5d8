//! Role-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::user::AppRole;
use crate::AppState;

/// Extractor that requires the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != AppRole::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(RequireAdmin(user))
    }
}

/// Extractor that requires the reviewer or admin role.
#[derive(Debug, Clone)]
pub struct RequireReviewer(pub CurrentUser);

impl FromRequestParts<AppState> for RequireReviewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_privileged() {
            return Err(AppError::Forbidden(
                "Reviewer or admin access required".to_string(),
            ));
        }
        Ok(RequireReviewer(user))
    }
}
