mod auth;
mod config;
mod db;
mod error;
mod game;
mod models;
mod routes;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use config::Config;
use db::{MemoryStore, PgStore, Store};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "millionaire_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Millionaire backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let store = open_store(&config).await?;
    if store.count_questions().await? == 0 {
        tracing::warn!("No questions stored yet, import some before starting games");
    }

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Postgres when a database is configured, process memory otherwise
async fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    let Some(database_url) = config.database_url() else {
        tracing::warn!("DATABASE_URL is not set, games will be kept in memory only");
        return Ok(Arc::new(MemoryStore::new()));
    };

    // Connect to database
    let pool = db::create_pool(database_url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations completed");

    Ok(Arc::new(PgStore::new(pool)))
}
