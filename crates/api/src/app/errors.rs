use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use gearshop_core::DomainError;
use gearshop_infra::CheckoutError;

/// Status, machine-readable code, and structured context for a domain error.
fn domain_error_parts(err: &DomainError) -> (StatusCode, &'static str, Value) {
    match err {
        DomainError::ProductNotFound { product_id } => (
            StatusCode::NOT_FOUND,
            "not_found",
            json!({ "product_id": product_id.to_string() }),
        ),
        DomainError::InsufficientStock {
            product_id,
            requested,
            available,
        } => (
            StatusCode::BAD_REQUEST,
            "insufficient_stock",
            json!({
                "product_id": product_id.to_string(),
                "requested": requested,
                "available": available,
            }),
        ),
        DomainError::Conflict {
            product_id,
            attempts,
        } => (
            StatusCode::CONFLICT,
            "conflict",
            json!({
                "product_id": product_id.to_string(),
                "attempts": attempts,
            }),
        ),
        DomainError::InvalidFilter(_) => (StatusCode::BAD_REQUEST, "invalid_filter", json!({})),
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error", json!({})),
        DomainError::StoreUnavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            json!({}),
        ),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let (status, code, extra) = domain_error_parts(&err);
    let mut body = json!({
        "error": code,
        "message": err.to_string(),
        "retryable": err.is_transient(),
    });
    merge(&mut body, extra);
    (status, axum::Json(body)).into_response()
}

/// Checkout failures propagate the failing line's error with its position.
pub fn checkout_error_to_response(err: CheckoutError) -> axum::response::Response {
    let (status, code, extra) = domain_error_parts(&err.source);
    let mut body = json!({
        "error": code,
        "message": err.to_string(),
        "retryable": err.source.is_transient(),
        "line_index": err.line_index,
        "product_id": err.product_id.to_string(),
        "requested": err.requested,
    });
    merge(&mut body, extra);
    (status, axum::Json(body)).into_response()
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

fn merge(body: &mut Value, extra: Value) {
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            body.insert(k.clone(), v.clone());
        }
    }
}
