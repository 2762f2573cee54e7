use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use gearshop_cart::{Cart, CartLine};
use gearshop_catalog::{Product, ProductFilter, ProductPatch, sort_by_price};
use gearshop_core::{CartId, ProductId};

use super::r#trait::{CartStore, CatalogStore, StockWrite, StoreError};

#[derive(Debug, Clone)]
struct StoredProduct {
    /// Insertion sequence: defines natural storage order for query ties.
    seq: u64,
    product: Product,
}

#[derive(Debug, Default)]
struct CatalogInner {
    next_seq: u64,
    products: HashMap<ProductId, StoredProduct>,
}

/// In-memory catalog store.
///
/// Intended for tests/dev. The conditional stock write holds the write lock
/// for the compare and the swap together, which gives the same atomicity the
/// Postgres implementation gets from a single conditional `UPDATE`.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<CatalogInner>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;

        // Re-inserting an existing id replaces the record but keeps its
        // position in natural storage order.
        let existing_seq = inner.products.get(&product.id).map(|s| s.seq);
        let seq = match existing_seq {
            Some(seq) => seq,
            None => {
                inner.next_seq += 1;
                inner.next_seq
            }
        };
        inner.products.insert(product.id, StoredProduct { seq, product });
        Ok(())
    }

    async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.products.get(&product_id).map(|s| s.product.clone()))
    }

    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;

        let mut matching: Vec<&StoredProduct> = inner
            .products
            .values()
            .filter(|s| filter.matches(&s.product))
            .collect();
        matching.sort_by_key(|s| s.seq);

        let mut products: Vec<Product> = matching.into_iter().map(|s| s.product.clone()).collect();
        // Stable sort: price ties keep the natural order established above.
        sort_by_price(&mut products, filter.sort);
        Ok(products)
    }

    async fn patch_product(
        &self,
        product_id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;

        match inner.products.get_mut(&product_id) {
            Some(stored) => {
                patch.apply_to(&mut stored.product);
                Ok(Some(stored.product.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.products.remove(&product_id).map(|s| s.product))
    }

    async fn compare_and_swap_stock(
        &self,
        product_id: ProductId,
        observed: i64,
        new: i64,
    ) -> Result<StockWrite, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;

        match inner.products.get_mut(&product_id) {
            Some(stored) => {
                if stored.product.stock != observed {
                    return Ok(StockWrite::Rejected);
                }
                stored.product.stock = new;
                stored.product.updated_at = Utc::now();
                Ok(StockWrite::Applied)
            }
            None => Ok(StockWrite::Missing),
        }
    }
}

/// In-memory cart store.
///
/// Delegates the merge law to `Cart::merge` so the dev/test behavior is the
/// same law the Postgres upsert encodes in SQL.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<CartId, Cart>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CartStore for InMemoryCartStore {
    async fn merge_line(&self, cart_id: CartId, line: CartLine) -> Result<CartLine, StoreError> {
        let mut carts = self.carts.write().map_err(|_| StoreError::LockPoisoned)?;
        let cart = carts.entry(cart_id).or_default();
        Ok(cart.merge(line).clone())
    }

    async fn cart_lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, StoreError> {
        let carts = self.carts.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(carts
            .get(&cart_id)
            .map(|c| c.lines().to_vec())
            .unwrap_or_default())
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<(), StoreError> {
        let mut carts = self.carts.write().map_err(|_| StoreError::LockPoisoned)?;
        carts.remove(&cart_id);
        Ok(())
    }
}
