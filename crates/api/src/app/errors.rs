use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ordergate_core::{DomainError, FieldErrors};

/// Map a domain error onto the wire: validation failures carry the field
/// map, everything else a single message.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(map) => validation_error(map),
        DomainError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, err.to_string()),
        DomainError::StateConflict(_) => json_error(StatusCode::CONFLICT, err.to_string()),
        DomainError::InvoiceGate => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        DomainError::StoreUnavailable(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
        }
    }
}

pub fn validation_error(errors: FieldErrors) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "status": "error",
            "errors": errors,
        })),
    )
        .into_response()
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "status": "error",
            "message": message.into(),
        })),
    )
        .into_response()
}
