//! # OMMS API
//!
//! The API crate provides the web server implementation for the OMMS
//! medical management backend. It defines RESTful endpoints for
//! appointment booking, medical records, the pharmacy stock ledger,
//! reporting, and authentication.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like authentication and error handling
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.
//! Every response is wrapped in the uniform `{code, message, data}` envelope.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// This struct encapsulates dependencies that are shared across the
/// application: the database connection pool and the token signing
/// configuration. It is injected at the composition root; no handler
/// reaches for process-wide globals.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// HS256 secret used to sign and verify access tokens
    pub jwt_secret: String,
    /// Access token lifetime in minutes
    pub token_expire_minutes: i64,
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes logging, builds the router with all route
/// groups, applies the CORS and timeout layers, and starts the HTTP
/// server.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        jwt_secret: config.jwt_secret.clone(),
        token_expire_minutes: config.token_expire_minutes,
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Authentication endpoints
        .merge(routes::auth::routes())
        // Appointment booking endpoints
        .merge(routes::appointments::routes())
        // Department management endpoints
        .merge(routes::departments::routes())
        // Doctor management endpoints
        .merge(routes::doctors::routes())
        // Schedule listing endpoints
        .merge(routes::schedules::routes())
        // Medical record endpoints
        .merge(routes::records::routes())
        // Pharmacy and stock ledger endpoints
        .merge(routes::pharmacy::routes())
        // Reporting endpoints
        .merge(routes::reports::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::PATCH,
                axum::http::Method::DELETE,
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
                    .map(|origin| origin.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
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
