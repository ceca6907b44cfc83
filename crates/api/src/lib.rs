//! # EduVate Auth API
//!
//! The API crate provides the HTTP surface of the EduVate authentication
//! and account-lifecycle core: sign-in, session validation, invitation
//! activation, password resets, and administrative account operations.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Auth**: Credential hashing, token generation, and rate limiting
//! - **Middleware**: Error-to-envelope mapping
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database
//! interactions. Every business-logic outcome is reported through a
//! `{success, ...}` JSON envelope with HTTP 200.

/// Credential hashing, tokens, and rate limiting
pub mod auth;
/// Configuration module for API settings
pub mod config;
/// Outbound mail delivery
pub mod email;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use auth::rate_limit::{MemoryRateLimiter, RateLimiter};
use email::{HttpMailer, Mailer, NoopMailer};

/// Shared application state accessible to all request handlers.
///
/// The rate limiter and mailer sit behind traits so tests (and future
/// deployments with a shared cache or a different provider) can swap the
/// implementations without touching handlers.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Server configuration (link bases, mail settings)
    pub config: config::ApiConfig,
    /// Sliding-window limiter for sensitive operations
    pub rate_limiter: Box<dyn RateLimiter>,
    /// Outbound mail delivery
    pub mailer: Box<dyn Mailer>,
}

/// Starts the API server with the provided configuration and database
/// connection.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mailer: Box<dyn Mailer> = match &config.mail_endpoint {
        Some(endpoint) => Box::new(HttpMailer::new(
            endpoint.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        )),
        None => {
            warn!("MAIL_ENDPOINT not set; invitation and reset mail will be logged and dropped");
            Box::new(NoopMailer)
        }
    };

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        config: config.clone(),
        rate_limiter: Box::new(MemoryRateLimiter::new()),
        mailer,
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Sign-in and session endpoints
        .merge(routes::auth::routes())
        // Invitation/activation endpoints
        .merge(routes::activation::routes())
        // Password reset endpoints
        .merge(routes::password::routes())
        // Administrative account endpoints
        .merge(routes::accounts::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration; the service is CORS-open unless origins
    // are pinned in the environment.
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app.layer(tower_http::cors::CorsLayer::permissive())
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
