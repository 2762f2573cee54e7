use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use gearshop_core::{CartId, ProductId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/:cart_id", get(get_cart).delete(clear_cart))
        .route("/:cart_id/items", post(add_item))
}

fn parse_cart_id(raw: &str) -> Result<CartId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid cart id")
    })
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cart_id): Path<String>,
    Json(body): Json<dto::AddCartItemRequest>,
) -> axum::response::Response {
    let cart_id = match parse_cart_id(&cart_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let product_id: ProductId = match body.product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };

    match services
        .carts
        .add_to_cart(cart_id, product_id, body.quantity)
        .await
    {
        Ok(line) => (StatusCode::OK, Json(dto::cart_line_to_json(&line))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cart_id): Path<String>,
) -> axum::response::Response {
    let cart_id = match parse_cart_id(&cart_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.carts.contents(cart_id).await {
        Ok(lines) => {
            let total_cents: i64 = lines.iter().map(|l| l.subtotal_cents()).sum();
            let body = serde_json::json!({
                "items": lines.iter().map(dto::cart_line_to_json).collect::<Vec<_>>(),
                "total_cents": total_cents,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cart_id): Path<String>,
) -> axum::response::Response {
    let cart_id = match parse_cart_id(&cart_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.carts.clear(cart_id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
