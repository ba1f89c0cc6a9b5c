//! # Meetgrid API
//!
//! Web server for the Meetgrid scheduling service: RESTful endpoints for
//! events, participant availability, the merged availability view and slot
//! registrations.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Error handling and cross-cutting concerns
//! - **Config**: Environment and application configuration
//!
//! The API uses Axum as the web framework, SQLx for persistence, and hands
//! slot claims to the `meetgrid-core` claim engine wired with the Postgres
//! stores and the HTTP meeting provisioner.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// HTTP client for the external meeting-link provider
pub mod provision;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use meetgrid_core::claim::SlotClaimEngine;
use meetgrid_db::stores::{PgEventStore, PgGridStore, PgIdentityResolver, PgRegistrantStore};
use provision::HttpMeetingProvisioner;

/// Shared application state that is accessible to all request handlers.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Claim engine wired with the Postgres stores and meeting provisioner
    pub engine: SlotClaimEngine,
}

/// Builds the claim engine from its Postgres-backed collaborators.
pub fn build_engine(db_pool: PgPool, config: &config::ApiConfig) -> SlotClaimEngine {
    SlotClaimEngine::new(
        Arc::new(PgEventStore::new(db_pool.clone())),
        Arc::new(PgGridStore::new(db_pool.clone())),
        Arc::new(PgRegistrantStore::new(db_pool.clone())),
        Arc::new(PgIdentityResolver::new(db_pool)),
        Arc::new(HttpMeetingProvisioner::new(&config.meeting_provider_url)),
    )
    .with_duration(config.meeting_duration_minutes)
}

/// Starts the API server with the provided configuration and database
/// connection.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let engine = build_engine(db_pool.clone(), &config);
    let state = Arc::new(ApiState { db_pool, engine });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Event management endpoints
        .merge(routes::event::routes())
        // Participant and availability submission endpoints
        .merge(routes::participant::routes())
        // Merged availability view
        .merge(routes::availability::routes())
        // Slot registration endpoints
        .merge(routes::registration::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect::<Vec<_>>();
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
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
