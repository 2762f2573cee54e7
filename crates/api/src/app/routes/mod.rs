use axum::Router;

pub mod carts;
pub mod checkout;
pub mod products;
pub mod system;

/// Router for all storefront endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/carts", carts::router())
        .nest("/checkout", checkout::router())
}
