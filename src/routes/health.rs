//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub session_store: String,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: checks the data store and the session revocation store.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let database = match state.store.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            format!("error: {e}")
        }
    };

    let session_store = match state.revocations.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Session store health check failed");
            format!("error: {e}")
        }
    };

    let status = if database == "connected" && session_store == "connected" {
        "ok"
    } else {
        "degraded"
    };

    ApiResponse::success(HealthStatus {
        status: status.to_string(),
        database,
        session_store,
    })
}
