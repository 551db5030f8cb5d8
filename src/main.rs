use std::net::SocketAddr;
use std::sync::Arc;

use mimalloc::MiMalloc;
use perftrack::config::AppConfig;
use perftrack::services::session::RevocationStore;
use perftrack::store::PgStore;
use perftrack::{db, routes, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "perftrack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let revocations = RevocationStore::redis(&config.redis_url)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        revocations,
        config,
    };
    let app = routes::router(state);

    tracing::info!(host = %addr, "Starting perftrack API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
