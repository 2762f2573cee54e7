use std::sync::Arc;

use thiserror::Error;

use gearshop_cart::CartLine;
use gearshop_catalog::{Product, ProductFilter, ProductPatch};
use gearshop_core::{CartId, DomainError, ProductId};

/// Store operation error.
///
/// These are **infrastructure failures** (connectivity, IO, malformed rows),
/// not business outcomes. They map to `DomainError::StoreUnavailable` at the
/// service boundary and are never swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation (connectivity, IO).
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored record could not be decoded into its domain type.
    #[error("malformed record: {0}")]
    Decode(String),

    /// In-process synchronization failed (a writer panicked mid-update).
    #[error("lock poisoned")]
    LockPoisoned,
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Decode(value.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        DomainError::store_unavailable(value.to_string())
    }
}

/// Outcome of the conditional stock write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockWrite {
    /// The write applied: stock still held the observed value.
    Applied,
    /// The write was rejected: stock changed between read and write
    /// (lost the race to a concurrent reserver).
    Rejected,
    /// No such product.
    Missing,
}

/// Document store holding the product catalog.
///
/// An explicit handle to this store is passed into each component (query
/// engine, reservation protocol, cart aggregator), which keeps the services
/// testable against the in-memory implementation.
///
/// ## Concurrency contract
///
/// `compare_and_swap_stock` must be atomic with respect to all other callers:
/// the write applies only if `stock` still equals `observed` at the moment of
/// the write. Several server processes may share one backing store, so this
/// conditional update (not any in-process lock) is the sole
/// concurrency-control mechanism for stock.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product(&self, product: Product) -> Result<(), StoreError>;

    async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Filtered lookup. Predicates are ANDed; results come back in the
    /// requested sort order with ties in natural storage order.
    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Apply the present fields of `patch`; returns the updated record, or
    /// `None` if the product does not exist. Field validation happens in the
    /// service layer before this call.
    async fn patch_product(
        &self,
        product_id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError>;

    /// Delete and return the record, or `None` if absent.
    async fn delete_product(&self, product_id: ProductId)
    -> Result<Option<Product>, StoreError>;

    /// Conditionally set stock to `new`, guarded on it still being
    /// `observed`. This is the load-bearing atomic primitive of the
    /// reservation protocol.
    async fn compare_and_swap_stock(
        &self,
        product_id: ProductId,
        observed: i64,
        new: i64,
    ) -> Result<StockWrite, StoreError>;
}

/// Persisted server-side carts.
///
/// Implementations must honor the cart merge law: at most one line per
/// product per cart; merging sums quantity and refreshes the name/price
/// snapshot (see `gearshop_cart::Cart::merge`).
#[async_trait::async_trait]
pub trait CartStore: Send + Sync {
    /// Merge `line` into the cart and return the post-merge line.
    async fn merge_line(&self, cart_id: CartId, line: CartLine) -> Result<CartLine, StoreError>;

    async fn cart_lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, StoreError>;

    async fn clear_cart(&self, cart_id: CartId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        (**self).insert_product(product).await
    }

    async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).fetch_product(product_id).await
    }

    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        (**self).find_products(filter).await
    }

    async fn patch_product(
        &self,
        product_id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        (**self).patch_product(product_id, patch).await
    }

    async fn delete_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, StoreError> {
        (**self).delete_product(product_id).await
    }

    async fn compare_and_swap_stock(
        &self,
        product_id: ProductId,
        observed: i64,
        new: i64,
    ) -> Result<StockWrite, StoreError> {
        (**self).compare_and_swap_stock(product_id, observed, new).await
    }
}

#[async_trait::async_trait]
impl<S> CartStore for Arc<S>
where
    S: CartStore + ?Sized,
{
    async fn merge_line(&self, cart_id: CartId, line: CartLine) -> Result<CartLine, StoreError> {
        (**self).merge_line(cart_id, line).await
    }

    async fn cart_lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, StoreError> {
        (**self).cart_lines(cart_id).await
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<(), StoreError> {
        (**self).clear_cart(cart_id).await
    }
}
