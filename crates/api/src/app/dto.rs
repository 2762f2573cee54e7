use serde::Deserialize;

use gearshop_cart::CartLine;
use gearshop_catalog::{Product, ProductFilter, SortOrder};
use gearshop_infra::{CheckoutReceipt, Reservation};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i64,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub lines: Vec<CheckoutLineRequest>,
}

/// Query-string shape of a product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    /// Comma-separated category tags.
    pub categories: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: Option<String>,
}

impl ListProductsQuery {
    /// Translate the wire shape into the domain filter.
    ///
    /// Bound validation itself happens in the query engine; only the sort
    /// token is parsed here.
    pub fn into_filter(self) -> Result<ProductFilter, axum::response::Response> {
        let sort = match self.sort.as_deref() {
            None | Some("none") => SortOrder::None,
            Some("priceAscending") => SortOrder::PriceAscending,
            Some("priceDescending") => SortOrder::PriceDescending,
            Some(other) => {
                return Err(errors::json_error(
                    axum::http::StatusCode::BAD_REQUEST,
                    "invalid_filter",
                    format!("sort must be none|priceAscending|priceDescending, got {other}"),
                ));
            }
        };

        let categories = self.categories.map(|csv| {
            csv.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        Ok(ProductFilter {
            search: self.search,
            categories,
            min_price_cents: self.min_price,
            max_price_cents: self.max_price,
            sort,
        })
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "category": p.category,
        "price_cents": p.price_cents,
        "stock": p.stock,
        "description": p.description,
        "images": p.images,
        "created_at": p.created_at.to_rfc3339(),
        "updated_at": p.updated_at.to_rfc3339(),
    })
}

pub fn cart_line_to_json(line: &CartLine) -> serde_json::Value {
    serde_json::json!({
        "product_id": line.product_id.to_string(),
        "name": line.name,
        "price_cents": line.price_cents,
        "quantity": line.quantity,
        "subtotal_cents": line.subtotal_cents(),
    })
}

pub fn reservation_to_json(r: &Reservation) -> serde_json::Value {
    serde_json::json!({
        "product_id": r.product_id.to_string(),
        "quantity": r.quantity,
        "remaining_stock": r.remaining_stock,
    })
}

pub fn receipt_to_json(receipt: &CheckoutReceipt) -> serde_json::Value {
    serde_json::json!({
        "lines": receipt.lines.iter().map(reservation_to_json).collect::<Vec<_>>(),
        "total_quantity": receipt.total_quantity,
    })
}
