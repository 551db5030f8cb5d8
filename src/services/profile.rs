//! Profile and role loading for an authenticated identity.

use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::user::{AppRole, Profile, UpdateProfile};
use crate::store::Store;

/// Fetch the profile row for a user.
pub async fn load_profile(store: &dyn Store, user_id: Uuid) -> Result<Profile, AppError> {
    store
        .find_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Fetch the single role assigned to a user.
///
/// Zero rows is `NotFound`; more than one is a `Conflict`. An ambiguous
/// assignment is never resolved by picking one of the rows.
pub async fn load_role(store: &dyn Store, user_id: Uuid) -> Result<AppRole, AppError> {
    let roles = store.find_roles(user_id).await?;
    match roles.as_slice() {
        [] => Err(AppError::NotFound("Role assignment not found".to_string())),
        [role] => Ok(*role),
        _ => {
            tracing::warn!(user_id = %user_id, "User has more than one role assignment");
            Err(AppError::Conflict(
                "User has more than one role assignment".to_string(),
            ))
        }
    }
}

/// Whether a user holds the given role.
pub async fn has_role(store: &dyn Store, user_id: Uuid, role: AppRole) -> Result<bool, AppError> {
    Ok(store.find_roles(user_id).await?.contains(&role))
}

/// Apply a validated partial update to the caller's profile.
pub async fn update_profile(
    store: &dyn Store,
    user_id: Uuid,
    input: &UpdateProfile,
) -> Result<Profile, AppError> {
    input.validate()?;
    store
        .update_profile(user_id, input)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}
