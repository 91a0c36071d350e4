use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use unitsvc_auth::{CallContext, IntrospectionError, Introspector, Scope, TraceInfo};

use crate::app::errors::json_error;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-route authentication state: the introspector and the scope the route
/// requires.
#[derive(Clone)]
pub struct AuthState {
    pub introspector: Arc<dyn Introspector>,
    pub required: Scope,
}

impl AuthState {
    pub fn new(introspector: Arc<dyn Introspector>, required: Scope) -> Self {
        Self {
            introspector,
            required,
        }
    }
}

/// Resolve the bearer token into a [`CallContext`] request extension.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())
        .map_err(|status| json_error(status, "unauthorized", "missing or malformed bearer token"))?;

    let principal = state
        .introspector
        .introspect(token, std::slice::from_ref(&state.required))
        .await
        .map_err(introspection_error_to_response)?;

    let trace = match request_id(req.headers()) {
        Some(id) => TraceInfo::with_request_id(id),
        None => TraceInfo::new(),
    };

    req.extensions_mut().insert(CallContext::new(principal, trace));

    Ok(next.run(req).await)
}

fn introspection_error_to_response(err: IntrospectionError) -> Response {
    match err {
        IntrospectionError::Unauthenticated(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg),
        IntrospectionError::InactiveToken => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "token is inactive or expired")
        }
        IntrospectionError::Unavailable(msg) => {
            tracing::warn!(error = %msg, "token introspection unavailable");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "auth_unavailable", msg)
        }
    }
}

fn request_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
