//! Chirp - Minimal Social Network Backend
//! Mission: REST API over SQLite with password auth and bearer tokens

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chirp_backend::{
    app,
    auth::JwtHandler,
    config::{load_env, Config},
    store::Db,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("🚀 Chirp backend starting");

    let config = Config::from_env().context("Invalid configuration")?;

    let db = Arc::new(Db::new(&config.db_path)?);
    let jwt = Arc::new(JwtHandler::new(
        config.jwt_secret.clone(),
        config.token_ttl_minutes,
    ));

    let state = AppState { db, jwt };

    let router = app(state)
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, router).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirp_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Restrict CORS to the configured origins; with none configured, fall
/// back to a permissive policy for development.
fn cors_layer(config: &Config) -> Result<CorsLayer> {
    if config.allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid origin in ALLOWED_ORIGINS: {o}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers(Any))
}
