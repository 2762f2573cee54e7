use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use gearshop_core::ProductId;
use gearshop_infra::CheckoutLine;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(checkout))
}

pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CheckoutRequest>,
) -> axum::response::Response {
    let mut lines = Vec::with_capacity(body.lines.len());
    for line in &body.lines {
        let product_id: ProductId = match line.product_id.parse() {
            Ok(v) => v,
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    format!("invalid product id: {}", line.product_id),
                );
            }
        };
        lines.push(CheckoutLine {
            product_id,
            quantity: line.quantity,
        });
    }

    match services.checkout.checkout(&lines).await {
        Ok(receipt) => (StatusCode::OK, Json(dto::receipt_to_json(&receipt))).into_response(),
        Err(e) => errors::checkout_error_to_response(e),
    }
}
