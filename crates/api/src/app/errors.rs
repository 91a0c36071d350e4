use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use unitsvc_core::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let kind = err.kind();
    match err {
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, kind.as_str(), "not found"),
        ServiceError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, kind.as_str(), msg),
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, kind.as_str(), msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_statuses() {
        assert_eq!(service_error_to_response(ServiceError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            service_error_to_response(ServiceError::bad_request("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            service_error_to_response(ServiceError::internal("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
