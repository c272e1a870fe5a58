//! HTTP surface - axum router, shared state, bearer authentication and the
//! mapping from [`crate::errors::Error`] to responses.
//!
//! Handlers are thin: they pull the caller out of the bearer token, translate
//! JSON into the `core` input types and back, and let `?` carry failures into
//! the error mapping.

pub mod error;
pub mod extractors;
pub mod handlers;

use crate::core::token::TokenIssuer;
use axum::Router;
use axum::routing::{delete, get, post, put};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection pool, shared by every request
    pub db: Arc<DatabaseConnection>,
    /// Immutable signer/verifier for bearer tokens
    pub tokens: Arc<TokenIssuer>,
    /// bcrypt work factor used at registration
    pub bcrypt_cost: u32,
}

impl AppState {
    /// Create new application state
    #[must_use]
    pub fn new(db: DatabaseConnection, tokens: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(tokens),
            bcrypt_cost,
        }
    }
}

/// Builds the full router with tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
    use handlers::{auth, events, grocery, health, people};

    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/status", get(auth::status))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/events", get(events::list).post(events::create))
        .route(
            "/api/events/:id",
            get(events::get).put(events::update).delete(events::delete),
        )
        .route("/api/people", get(people::list).post(people::create))
        .route(
            "/api/people/:id",
            put(people::update).delete(people::delete),
        )
        .route("/api/grocery/categories", get(grocery::categories))
        .route("/api/grocery/items", post(grocery::create_item))
        .route("/api/grocery/items/checked", delete(grocery::clear_checked))
        .route(
            "/api/grocery/items/:id",
            put(grocery::update_item).delete(grocery::delete_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
