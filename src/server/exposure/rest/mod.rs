//! REST API exposure
//!
//! Consumes a `ServerHost` and produces an Axum `Router` with health checks,
//! the caller identity endpoint and the CRUD routes of every registered entity.

pub mod handlers;

use super::super::host::ServerHost;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::{Caller, CrudState, HasAuthProvider};

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Custom routes are merged after the entity routes and share the same
    /// tracing and CORS layers.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Router {
        let health_routes = Self::health_routes();
        let auth_routes = Router::new()
            .route("/auth/me", get(handlers::me))
            .with_state(host.auth.clone());
        let entity_routes = host.entity_registry.build_routes(&host);

        let mut app = health_routes.merge(auth_routes).merge(entity_routes);

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app.layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "clinic-admin"
        }))
    }
}
