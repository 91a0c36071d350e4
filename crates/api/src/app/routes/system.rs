use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{StatusCode, header},
    response::IntoResponse,
};

use unitsvc_observability::MetricsRegistry;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Prometheus text exposition of the process metrics.
pub async fn metrics(Extension(registry): Extension<Arc<MetricsRegistry>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        registry.render(),
    )
}
