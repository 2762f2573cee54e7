//! Checkout orchestrator.
//!
//! Lines are processed strictly in the supplied order, each through the
//! reservation protocol. The first failing line stops the run and is
//! reported with full context. Reservations made for earlier lines stay
//! decremented: a multi-line checkout is deliberately **not** transactional
//! across lines (the per-line decrement is atomic; the whole is not).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gearshop_core::{DomainError, ProductId};

use crate::reservation::{Reservation, ReservationPolicy, StockReserver};
use crate::store::CatalogStore;

/// One requested checkout line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Successful checkout: every line reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub lines: Vec<Reservation>,
    pub total_quantity: i64,
}

/// A failed checkout, pinned to the line that broke it.
///
/// `line_index` is deterministic because lines are processed in order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checkout failed at line {line_index} ({product_id}): {source}")]
pub struct CheckoutError {
    pub line_index: usize,
    pub product_id: ProductId,
    pub requested: i64,
    #[source]
    pub source: DomainError,
}

/// Checkout service, bound to a catalog store handle.
#[derive(Debug, Clone)]
pub struct CheckoutOrchestrator<S> {
    reserver: StockReserver<S>,
}

impl<S> CheckoutOrchestrator<S> {
    pub fn new(store: S) -> Self {
        Self {
            reserver: StockReserver::new(store),
        }
    }

    pub fn with_policy(store: S, policy: ReservationPolicy) -> Self {
        Self {
            reserver: StockReserver::with_policy(store, policy),
        }
    }
}

impl<S: CatalogStore> CheckoutOrchestrator<S> {
    /// Reserve every line, in order; stop at the first failure.
    pub async fn checkout(
        &self,
        lines: &[CheckoutLine],
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let mut reserved = Vec::with_capacity(lines.len());

        for (line_index, line) in lines.iter().enumerate() {
            match self.reserver.reserve(line.product_id, line.quantity).await {
                Ok(reservation) => reserved.push(reservation),
                Err(source) => {
                    tracing::warn!(
                        line_index,
                        product_id = %line.product_id,
                        requested = line.quantity,
                        reserved_so_far = reserved.len(),
                        "checkout stopped at failing line"
                    );
                    return Err(CheckoutError {
                        line_index,
                        product_id: line.product_id,
                        requested: line.quantity,
                        source,
                    });
                }
            }
        }

        let total_quantity = reserved.iter().map(|r| r.quantity).sum();
        Ok(CheckoutReceipt {
            lines: reserved,
            total_quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{CatalogStore, InMemoryCatalogStore};
    use gearshop_catalog::Product;

    async fn seeded(
        products: &[Product],
    ) -> (CheckoutOrchestrator<Arc<InMemoryCatalogStore>>, Arc<InMemoryCatalogStore>) {
        let store = Arc::new(InMemoryCatalogStore::new());
        for p in products {
            store.insert_product(p.clone()).await.unwrap();
        }
        (CheckoutOrchestrator::new(store.clone()), store)
    }

    #[tokio::test]
    async fn all_lines_reserve_in_order() {
        let a = Product::new("Band", "bands", 1299, 10).unwrap();
        let b = Product::new("Kettlebell", "weights", 5999, 4).unwrap();
        let (orchestrator, store) = seeded(&[a.clone(), b.clone()]).await;

        let receipt = orchestrator
            .checkout(&[
                CheckoutLine {
                    product_id: a.id,
                    quantity: 2,
                },
                CheckoutLine {
                    product_id: b.id,
                    quantity: 1,
                },
            ])
            .await
            .unwrap();

        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.total_quantity, 3);
        assert_eq!(store.fetch_product(a.id).await.unwrap().unwrap().stock, 8);
        assert_eq!(store.fetch_product(b.id).await.unwrap().unwrap().stock, 3);
    }

    #[tokio::test]
    async fn first_failure_stops_and_earlier_lines_stay_decremented() {
        let a = Product::new("Band", "bands", 1299, 10).unwrap();
        let b = Product::new("Kettlebell", "weights", 5999, 10).unwrap();
        let c = Product::new("Mat", "mats", 3499, 10).unwrap();
        let (orchestrator, store) = seeded(&[a.clone(), b.clone(), c.clone()]).await;

        let err = orchestrator
            .checkout(&[
                CheckoutLine {
                    product_id: a.id,
                    quantity: 2,
                },
                CheckoutLine {
                    product_id: b.id,
                    quantity: 100,
                },
                CheckoutLine {
                    product_id: c.id,
                    quantity: 1,
                },
            ])
            .await
            .unwrap_err();

        assert_eq!(err.line_index, 1);
        assert_eq!(err.product_id, b.id);
        assert_eq!(err.requested, 100);
        assert!(matches!(
            err.source,
            gearshop_core::DomainError::InsufficientStock { available: 10, .. }
        ));

        // Line A stays decremented (documented non-transactional behavior),
        // line C after the failure was never attempted.
        assert_eq!(store.fetch_product(a.id).await.unwrap().unwrap().stock, 8);
        assert_eq!(store.fetch_product(b.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(store.fetch_product(c.id).await.unwrap().unwrap().stock, 10);
    }

    #[tokio::test]
    async fn unknown_product_reports_the_failing_line() {
        let a = Product::new("Band", "bands", 1299, 10).unwrap();
        let (orchestrator, _) = seeded(std::slice::from_ref(&a)).await;
        let ghost = gearshop_core::ProductId::new();

        let err = orchestrator
            .checkout(&[
                CheckoutLine {
                    product_id: a.id,
                    quantity: 1,
                },
                CheckoutLine {
                    product_id: ghost,
                    quantity: 1,
                },
            ])
            .await
            .unwrap_err();

        assert_eq!(err.line_index, 1);
        assert!(matches!(
            err.source,
            gearshop_core::DomainError::ProductNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn empty_checkout_yields_empty_receipt() {
        let (orchestrator, _) = seeded(&[]).await;

        let receipt = orchestrator.checkout(&[]).await.unwrap();
        assert!(receipt.lines.is_empty());
        assert_eq!(receipt.total_quantity, 0);
    }
}
