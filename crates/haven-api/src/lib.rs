//! # haven-api
//!
//! REST API layer for Haven. Provides HTTP endpoints for authentication,
//! listings, wishlists, seller verification, the chat assistant, and the
//! admin dashboard.

pub mod auth;
pub mod middleware;
pub mod oauth;
pub mod routes;

use axum::Router;
use haven_assistant::AssistantClient;
use haven_db::{Database, mailer::Mailer, storage::StorageClient};
use std::sync::Arc;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// MinIO / S3-compatible object storage for listing photos, profile
    /// pictures, and verification documents.
    pub storage: StorageClient,
    /// Outbound mail — confirmation links, password resets, verification
    /// decisions.
    pub mailer: Mailer,
    /// Generative-AI client backing the chat assistant.
    pub assistant: AssistantClient,
    /// Plain HTTP client for OAuth UserInfo verification.
    pub http: reqwest::Client,
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::oauth::router())
        .merge(routes::users::router())
        .merge(routes::verification::router())
        .merge(routes::properties::public_router())
        .merge(routes::properties::router())
        .merge(routes::images::public_router())
        .merge(routes::images::router())
        .merge(routes::wishlist::router())
        .merge(routes::chat::router())
        .merge(routes::admin_users::router())
        .merge(routes::admin_verifications::router())
        .merge(routes::admin_properties::router())
        .merge(routes::analytics::router())
        .merge(routes::health::router());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .with_state(Arc::new(state))
}
