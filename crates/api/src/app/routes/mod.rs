use std::sync::Arc;

use axum::Router;

use unitsvc_auth::Introspector;

pub mod system;
pub mod units;

/// Router for all authenticated endpoints.
pub fn router(introspector: Arc<dyn Introspector>) -> Router {
    Router::new().merge(units::router(introspector))
}
