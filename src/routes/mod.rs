//! Route definitions for the perftrack API.

pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod institutions;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Request bodies here are small JSON documents; file bytes go to external storage.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, url = %state.config.frontend_url, "Invalid FRONTEND_URL, CORS disabled");
            CorsLayer::new()
        }
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/auth/session", get(auth::session))
        .route("/auth/logout", post(auth::logout))
        .route("/profile", get(auth::me).put(auth::update_me));

    let dashboard_routes = Router::new().route("/dashboard", get(dashboard::show));

    let document_routes = Router::new()
        .route(
            "/documents",
            get(documents::list).post(documents::create),
        )
        .route("/documents/queue", get(documents::queue))
        .route("/documents/{id}", get(documents::get_by_id))
        .route("/documents/{id}/status", patch(documents::update_status));

    let institution_routes = Router::new()
        .route("/institutions", get(institutions::list))
        .route("/institutions/{id}", get(institutions::get_by_id))
        .route("/institutions/{id}/scores", get(institutions::scores))
        .route("/rankings", get(institutions::rankings));

    let audit_routes = Router::new().route("/audit-logs", get(audit::list));

    let api = Router::new()
        .merge(auth_routes)
        .merge(dashboard_routes)
        .merge(document_routes)
        .merge(institution_routes)
        .merge(audit_routes);

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
