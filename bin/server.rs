// Ad Spend Dashboard - Web Server

use adspend::{api_routes, telemetry, AppState, Config, SqliteStore};
use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    telemetry::init_tracing("info,tower_http=info", config.log_json);

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    info!(db = %config.db_path.display(), "database opened");

    let policy = config.access_policy();
    if policy.is_open() {
        warn!("ADSPEND_ADMIN_PASSWORD not set: entry writes are open to every caller");
    }

    let state = AppState::new(Box::new(store), policy);

    // Build main router
    let app = Router::new()
        .nest("/api", api_routes(state))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
