//! Blog Backend
//!
//! Signup/login with session cookies and CRUD over free-form posts.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and response envelopes
//! - Services: Auth and post business logic
//! - Repositories: Document store access (PostgreSQL or in-memory)
//! - Sessions: TTL-bound session records (Redis or in-memory)

use anyhow::Result;
use blog_backend::auth::{MemorySessionStore, RedisSessionStore, SessionStore};
use blog_backend::config::{self, AppConfig, StoreBackend, DEVELOPMENT_SESSION_SECRET};
use blog_backend::repositories::Repositories;
use blog_backend::{db, routes, state::AppState};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        compat_mode = config.api.compat_mode,
        "Starting blog backend"
    );

    if AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let repositories = connect_document_store(&config).await?;
    let sessions = connect_session_store(&config).await?;

    let state = AppState::new(repositories, sessions, config.clone());
    let app = routes::create_router(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Connect the configured document store
async fn connect_document_store(config: &AppConfig) -> Result<Repositories> {
    match config.database.backend {
        StoreBackend::Postgres => {
            info!("Connecting to database...");
            let pool = db::create_pool(&config.database).await?;
            // Production runs migrations as a separate job
            if !AppConfig::is_production() {
                db::run_migrations(&pool).await?;
            }
            Ok(Repositories::postgres(pool))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory document store; data is lost on restart");
            Ok(Repositories::in_memory())
        }
        StoreBackend::Redis => anyhow::bail!("redis cannot back the document store"),
    }
}

/// Connect the configured session store
async fn connect_session_store(config: &AppConfig) -> Result<Arc<dyn SessionStore>> {
    match config.redis.backend {
        StoreBackend::Redis => {
            info!("Connecting to Redis...");
            let store = RedisSessionStore::connect(&config.redis.connection_url()).await?;
            info!("Redis connection established");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory session store; sessions are lost on restart");
            Ok(Arc::new(MemorySessionStore::default()))
        }
        StoreBackend::Postgres => anyhow::bail!("postgres cannot back the session store"),
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "blog_backend=info,tower_http=info".into()
        } else {
            "blog_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    let secret = config.session.secret.expose_secret();
    if secret == DEVELOPMENT_SESSION_SECRET || secret.len() < 32 {
        errors.push("Session secret must be at least 32 characters and not the development default");
    }

    if config.database.backend == StoreBackend::Memory || config.redis.backend == StoreBackend::Memory {
        warn!("In-memory stores configured in production - ensure this is intentional");
    }

    if config.database.host == "localhost" || config.database.host == "127.0.0.1" {
        warn!("Database host is localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
