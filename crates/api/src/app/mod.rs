//! HTTP application wiring (Axum routers + service wiring).
//!
//! - `services.rs`: collaborator selection and the unit service chain
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use unitsvc_observability::MetricsRegistry;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the public API router.
pub fn build_app(services: Arc<AppServices>) -> Router {
    let protected = routes::router(services.introspector.clone());

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

/// Build the debug router served on the separate debug listener.
pub fn build_debug_app(registry: Arc<MetricsRegistry>) -> Router {
    Router::new()
        .route("/metrics", get(routes::system::metrics))
        .route("/health", get(routes::system::health))
        .layer(Extension(registry))
}
