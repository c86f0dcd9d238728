use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use webnotas_core::DomainError;
use webnotas_infra::jobs::EngineError;
use webnotas_infra::StoreError;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => bad_request(msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::DuplicateKey(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        other => {
            error!(error = %other, "store failure while handling request");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", other.to_string())
        }
    }
}

pub fn engine_error_to_response(err: EngineError) -> Response {
    match err {
        EngineError::CompanyNotFound(id) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("company {id} not found"))
        }
        EngineError::Store(e) => store_error_to_response(e),
        other => json_error(StatusCode::INTERNAL_SERVER_ERROR, "engine_error", other.to_string()),
    }
}

/// Router fallback.
pub async fn route_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "route not found")
}
