//! Cart aggregator: reserve-then-merge.
//!
//! Stock is reserved **before** the cart mutates, so a cart line always
//! represents quantity the store has actually set aside; the cart never
//! holds a phantom reservation the store cannot honor.

use gearshop_cart::CartLine;
use gearshop_core::{CartId, DomainError, DomainResult, ProductId};

use crate::reservation::{ReservationPolicy, StockReserver};
use crate::store::{CartStore, CatalogStore};

/// Cart service, bound to a catalog store and a cart store handle.
#[derive(Debug, Clone)]
pub struct CartAggregator<S, C> {
    catalog: S,
    carts: C,
    reserver: StockReserver<S>,
}

impl<S: Clone, C> CartAggregator<S, C> {
    pub fn new(catalog: S, carts: C) -> Self {
        let reserver = StockReserver::new(catalog.clone());
        Self {
            catalog,
            carts,
            reserver,
        }
    }

    pub fn with_policy(catalog: S, carts: C, policy: ReservationPolicy) -> Self {
        let reserver = StockReserver::with_policy(catalog.clone(), policy);
        Self {
            catalog,
            carts,
            reserver,
        }
    }
}

impl<S: CatalogStore + Clone, C: CartStore> CartAggregator<S, C> {
    /// Add `quantity` units of a product to the cart.
    ///
    /// Reserves stock first; on success the line is merged into the cart
    /// (summing quantity with any existing line for the same product and
    /// refreshing the name/price snapshot) and the post-merge line returned.
    pub async fn add_to_cart(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<CartLine> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "cart quantity must be positive, got {quantity}"
            )));
        }

        let product = self
            .catalog
            .fetch_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found(product_id))?;

        let reservation = self.reserver.reserve(product_id, quantity).await?;

        let line = CartLine::snapshot(&product, reservation.quantity);
        let merged = self.carts.merge_line(cart_id, line).await?;

        tracing::debug!(
            %cart_id,
            %product_id,
            quantity,
            merged_quantity = merged.quantity,
            "cart line merged"
        );
        Ok(merged)
    }

    /// Current lines of the cart (empty for an unknown cart).
    pub async fn contents(&self, cart_id: CartId) -> DomainResult<Vec<CartLine>> {
        Ok(self.carts.cart_lines(cart_id).await?)
    }

    pub async fn clear(&self, cart_id: CartId) -> DomainResult<()> {
        Ok(self.carts.clear_cart(cart_id).await?)
    }
}
