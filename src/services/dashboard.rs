//! Dashboard load: identity → profile and role → scoped counts.

use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{AppRole, Profile};
use crate::services::profile;
use crate::services::stats::{self, StatsScope, StatsSummary};
use crate::store::Store;

/// Everything the dashboard view needs for one user.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub profile: Profile,
    pub role: AppRole,
    pub scope: StatsScope,
    pub stats: StatsSummary,
}

/// Load the dashboard for an authenticated user, bounded by `timeout`.
pub async fn load_dashboard(
    store: &dyn Store,
    user_id: Uuid,
    timeout: Duration,
) -> Result<Dashboard, AppError> {
    tokio::time::timeout(timeout, load(store, user_id))
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "Dashboard did not load within {} ms",
                timeout.as_millis()
            ))
        })?
}

async fn load(store: &dyn Store, user_id: Uuid) -> Result<Dashboard, AppError> {
    let (profile, role) = tokio::try_join!(
        profile::load_profile(store, user_id),
        profile::load_role(store, user_id),
    )?;
    let scope = stats::resolve_scope(store, role, user_id).await?;
    let stats = stats::stats_for_scope(store, scope).await?;

    tracing::debug!(user_id = %user_id, role = ?role, scope = ?scope, "Dashboard loaded");

    Ok(Dashboard {
        profile,
        role,
        scope,
        stats,
    })
}
