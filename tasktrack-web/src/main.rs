//! # TaskTrack Web Server
//!
//! Serves the project and task tracker over HTTP.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Open the store: PostgreSQL (creating the database and applying
//!    migrations) or the in-memory backend
//! 3. Compile templates and build the router
//! 4. Serve until Ctrl+C, then drain and close the pool
//!
//! ## Usage
//!
//! ```bash
//! SESSION_SECRET=$(openssl rand -hex 32) STORAGE_BACKEND=memory cargo run -p tasktrack-web
//! ```

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tasktrack_shared::{
    db::{
        migrations::{ensure_database_exists, get_migration_status, run_migrations},
        pool::{close_pool, create_pool, get_pool_stats, DatabaseConfig},
    },
    store::{MemoryStore, PgStore, Store},
};
use tasktrack_web::{
    app::{build_router, AppState},
    config::{Config, StorageBackend},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("TaskTrack v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;
    let (store, pool) = open_store(&config).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(store, config).context("Failed to compile templates")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasktrack_web=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Opens the configured store; the pool is returned so it can be closed on shutdown
async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn Store>, Option<PgPool>)> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok((Arc::new(MemoryStore::new()), None))
        }
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .clone()
                .context("DATABASE_URL environment variable is required")?;

            ensure_database_exists(&url)
                .await
                .context("Failed to create database")?;

            let mut db_config = DatabaseConfig::new(url);
            db_config.max_connections = config.storage.max_connections;

            let pool = create_pool(db_config)
                .await
                .context("Failed to connect to database")?;

            run_migrations(&pool).await.context("Failed to run migrations")?;

            let status = get_migration_status(&pool).await?;
            let stats = get_pool_stats(&pool);
            tracing::info!(
                applied = status.applied_migrations,
                up_to_date = status.is_up_to_date,
                pool_size = stats.total_connections,
                "Database ready"
            );

            Ok((Arc::new(PgStore::new(pool.clone())), Some(pool)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
