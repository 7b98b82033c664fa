//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for the chart of accounts, fiscal years, journals and treasury
//! - The bearer-token guard
//! - The `{ok, message, ...}` response envelope with localized messages

pub mod context;
pub mod i18n;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use daftar_db::MappingResolver;
use daftar_shared::{Environment, JwtService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service backing the authentication guard.
    pub jwt_service: Arc<JwtService>,
    /// Account mapping resolution for treasury posting.
    pub mappings: Arc<MappingResolver>,
    /// Deployment environment.
    pub environment: Environment,
}

impl AppState {
    /// Returns a connection handle for constructing a repository.
    #[must_use]
    pub fn db(&self) -> DatabaseConnection {
        (*self.db).clone()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            context::context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
