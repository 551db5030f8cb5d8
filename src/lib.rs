pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use services::session::RevocationStore;
use store::Store;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub revocations: RevocationStore,
    pub config: config::AppConfig,
}
