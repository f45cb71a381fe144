//! Portfolio API - library for app logic and testing

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::{AppConfig, ConfigError};
use crate::db::{MemoryStore, PgStore, Store};
use crate::error::AppError;
use crate::state::AppState;

/// Reasons the server can fail to come up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("admin seed failed: {0}")]
    Seed(#[from] AppError),
    #[error("invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configure CORS from environment variables.
/// Uses ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN.
/// Falls back to the local dev origins.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    let public = Router::new()
        .route("/", get(routes::index::api_index))
        .route("/health", get(routes::health::health_ping))
        .route("/health/database", get(routes::health::health_database))
        .route("/api/users/register", post(routes::users::register))
        .route("/api/users/login", post(routes::users::login))
        .route("/api/projects", get(routes::projects::list_projects))
        .route("/api/projects/{id}", get(routes::projects::get_project))
        .route("/api/blog", get(routes::blog::list_posts))
        .route("/api/blog/{id}", get(routes::blog::get_post))
        .route("/api/blog/{id}/comments", get(routes::blog::list_comments))
        .route("/api/contact", post(routes::contact::submit_message));

    // Everything below needs a verified bearer token.
    let protected = Router::new()
        .route("/api/users/profile", get(routes::users::profile))
        .route("/api/projects", post(routes::projects::create_project))
        .route(
            "/api/projects/{id}",
            axum::routing::put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/api/blog", post(routes::blog::create_post))
        .route(
            "/api/blog/{id}",
            axum::routing::put(routes::blog::update_post).delete(routes::blog::delete_post),
        )
        .route("/api/blog/{id}/comments", post(routes::blog::create_comment))
        .route(
            "/api/blog/{id}/comments/{comment_id}",
            delete(routes::blog::delete_comment),
        )
        .route("/api/contact", get(routes::contact::list_messages))
        .route("/api/contact/{id}", delete(routes::contact::delete_message))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::protect));

    public
        .merge(protected)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Global 2 MB request body cap
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// Pick the store: Postgres when DATABASE_URL is set, memory otherwise.
async fn build_store(config: &AppConfig) -> Result<Arc<dyn Store>, StartupError> {
    match &config.database {
        Some(db_config) => {
            let pool = db::init_pool(db_config).await?;
            db::run_migrations(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Using in-memory store; data is lost on restart.");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    // Dropping these shuts down the background log writers.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    let config = AppConfig::from_env()?;
    if config.is_production() && config.admin.is_none() {
        tracing::warn!("No admin account configured; contact messages cannot be read.");
    }

    let store = build_store(&config).await?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config, store);

    if let Some(seed) = state.config.admin.clone() {
        services::users::ensure_admin(&state, &seed).await?;
    }

    let app = create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::send;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_public_and_protected_share_paths() {
        let app = create_app(AppState::for_tests());

        let (status, _) = send(app.clone(), "GET", "/api/blog", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            app,
            "POST",
            "/api/blog",
            None,
            Some(serde_json::json!({"title": "t", "content": "c"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_contact_submit_is_public() {
        let app = create_app(AppState::for_tests());
        let (status, _) = send(
            app,
            "POST",
            "/api/contact",
            None,
            Some(serde_json::json!({
                "name": "Visitor",
                "email": "visitor@example.com",
                "message": "Hello there"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = create_app(AppState::for_tests());
        let (status, _) = send(app, "GET", "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
