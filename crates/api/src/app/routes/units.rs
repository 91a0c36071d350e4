use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde_json::json;

use unitsvc_auth::{CallContext, Introspector, Scope};
use unitsvc_core::{ClassId, UnitId};
use unitsvc_service::UnitService;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::{AuthState, auth_middleware};

/// Unit routes; each method is guarded by its own scope.
pub fn router(introspector: Arc<dyn Introspector>) -> Router {
    let auth = |scope: Scope| AuthState::new(introspector.clone(), scope);

    Router::new()
        .route(
            "/units",
            get(list_units)
                .route_layer(from_fn_with_state(auth(Scope::UNITS_LIST), auth_middleware))
                .merge(
                    post(create_unit)
                        .route_layer(from_fn_with_state(auth(Scope::UNITS_CREATE), auth_middleware)),
                ),
        )
        .route(
            "/units/:unit_id",
            get(get_unit)
                .route_layer(from_fn_with_state(auth(Scope::UNITS_GET), auth_middleware))
                .merge(
                    patch(rename_unit)
                        .route_layer(from_fn_with_state(auth(Scope::UNITS_RENAME), auth_middleware)),
                )
                .merge(
                    delete(delete_unit)
                        .route_layer(from_fn_with_state(auth(Scope::UNITS_DELETE), auth_middleware)),
                ),
        )
}

fn parse_unit_id(raw: &str) -> Result<UnitId, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid unit id"))
}

fn parse_class_id(raw: &str) -> Result<ClassId, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid class id"))
}

fn invalid_body(rejection: JsonRejection) -> Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub async fn list_units(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    query: Result<Query<dto::ListUnitsQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text());
        }
    };
    let Some(raw) = query.class_id.as_deref() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", "classID is required");
    };
    let class_id = match parse_class_id(raw) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.units.list_units(&ctx, class_id).await {
        Ok(units) => Json(dto::ListUnitsResponse { units }).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    Path(unit_id): Path<String>,
) -> Response {
    let unit_id = match parse_unit_id(&unit_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.units.get_unit(&ctx, unit_id).await {
        Ok(unit) => Json(dto::UnitResponse { unit: unit.into() }).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    body: Result<Json<dto::CreateUnitRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return invalid_body(rejection),
    };
    let class_id = match parse_class_id(&body.class_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.units.create_unit(&ctx, class_id, &body.title).await {
        Ok(()) => (StatusCode::CREATED, Json(json!({}))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn rename_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    Path(unit_id): Path<String>,
    body: Result<Json<dto::RenameUnitRequest>, JsonRejection>,
) -> Response {
    let unit_id = match parse_unit_id(&unit_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return invalid_body(rejection),
    };

    match services.units.rename_unit(&ctx, unit_id, &body.title).await {
        Ok(()) => Json(json!({})).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_unit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CallContext>,
    Path(unit_id): Path<String>,
) -> Response {
    let unit_id = match parse_unit_id(&unit_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.units.delete_unit(&ctx, unit_id).await {
        Ok(()) => Json(json!({})).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
