//! Integration tests for the reservation protocol's concurrency properties.
//!
//! Verifies:
//! - Concurrent reservations never jointly overdraw stock below zero
//! - Accounting: final stock = initial stock - sum of successful reservations
//! - Losers fail with `InsufficientStock` or `Conflict`, never silently
//! - The documented non-transactional multi-line checkout behavior

use std::sync::Arc;
use std::time::Duration;

use gearshop_catalog::Product;
use gearshop_core::DomainError;

use crate::checkout::{CheckoutLine, CheckoutOrchestrator};
use crate::reservation::{ReservationPolicy, StockReserver};
use crate::store::{CatalogStore, InMemoryCatalogStore};

fn contended_policy() -> ReservationPolicy {
    // Generous budget: these tests care about safety, not giving up early.
    ReservationPolicy {
        max_attempts: 32,
        backoff_base: Duration::from_millis(1),
        backoff_cap: Duration::from_millis(8),
    }
}

async fn seeded_store(stock: i64) -> (Arc<InMemoryCatalogStore>, Product) {
    let store = Arc::new(InMemoryCatalogStore::new());
    let product = Product::new("Resistance Band", "bands", 1299, stock).unwrap();
    store.insert_product(product.clone()).await.unwrap();
    (store, product)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_never_overdraw() {
    const INITIAL_STOCK: i64 = 50;
    const CALLERS: usize = 20;
    const QUANTITY: i64 = 5;
    // 20 * 5 = 100 requested against 50 in stock: at most 10 can win.

    let (store, product) = seeded_store(INITIAL_STOCK).await;
    let reserver = Arc::new(StockReserver::with_policy(
        store.clone(),
        contended_policy(),
    ));

    let mut handles = Vec::with_capacity(CALLERS);
    for _ in 0..CALLERS {
        let reserver = reserver.clone();
        let product_id = product.id;
        handles.push(tokio::spawn(async move {
            reserver.reserve(product_id, QUANTITY).await
        }));
    }

    let mut successes = 0i64;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(reservation) => {
                assert_eq!(reservation.quantity, QUANTITY);
                assert!(reservation.remaining_stock >= 0);
                successes += 1;
            }
            Err(DomainError::InsufficientStock { available, .. }) => {
                assert!(available >= 0);
            }
            Err(DomainError::Conflict { .. }) => {}
            Err(other) => panic!("unexpected failure mode: {other:?}"),
        }
    }

    let final_stock = store
        .fetch_product(product.id)
        .await
        .unwrap()
        .unwrap()
        .stock;

    // The aggregate successful decrement never exceeds the initial stock,
    // and the store accounts for every success exactly once.
    assert!(successes * QUANTITY <= INITIAL_STOCK);
    assert_eq!(final_stock, INITIAL_STOCK - successes * QUANTITY);
    assert!(final_stock >= 0);
    assert!(successes > 0, "at least one reservation should win");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mixed_quantities_account_exactly() {
    const INITIAL_STOCK: i64 = 17;

    let (store, product) = seeded_store(INITIAL_STOCK).await;
    let reserver = Arc::new(StockReserver::with_policy(
        store.clone(),
        contended_policy(),
    ));

    let quantities = [1i64, 2, 3, 4, 5, 6, 7, 8];
    let mut handles = Vec::new();
    for quantity in quantities {
        let reserver = reserver.clone();
        let product_id = product.id;
        handles.push(tokio::spawn(async move {
            (quantity, reserver.reserve(product_id, quantity).await)
        }));
    }

    let mut reserved_total = 0i64;
    for handle in handles {
        let (quantity, outcome) = handle.await.unwrap();
        if let Ok(reservation) = outcome {
            assert_eq!(reservation.quantity, quantity);
            reserved_total += quantity;
        }
    }

    let final_stock = store
        .fetch_product(product.id)
        .await
        .unwrap()
        .unwrap()
        .stock;

    assert!(reserved_total <= INITIAL_STOCK);
    assert_eq!(final_stock, INITIAL_STOCK - reserved_total);
}

#[tokio::test]
async fn sequential_reservations_take_the_maximal_count() {
    // Deterministic counterpart of the concurrency property: with stock 10
    // and repeated requests for 3, exactly three succeed and the fourth sees
    // the true remainder.
    let (store, product) = seeded_store(10).await;
    let reserver = StockReserver::new(store.clone());

    for expected_remaining in [7, 4, 1] {
        let reservation = reserver.reserve(product.id, 3).await.unwrap();
        assert_eq!(reservation.remaining_stock, expected_remaining);
    }

    match reserver.reserve(product.id, 3).await.unwrap_err() {
        DomainError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, 3);
            assert_eq!(available, 1);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_share_stock_safely() {
    // Two checkouts race for the same product; whatever each wins, the store
    // never goes negative and every receipt is backed by real stock.
    let (store, product) = seeded_store(6).await;

    let make_orchestrator =
        || CheckoutOrchestrator::with_policy(store.clone(), contended_policy());

    let lines = [CheckoutLine {
        product_id: product.id,
        quantity: 4,
    }];

    let first = make_orchestrator();
    let second = make_orchestrator();
    let (a, b) = tokio::join!(first.checkout(&lines), second.checkout(&lines));

    let wins = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "stock 6 can satisfy exactly one checkout of 4");

    let final_stock = store
        .fetch_product(product.id)
        .await
        .unwrap()
        .unwrap()
        .stock;
    assert_eq!(final_stock, 2);

    let loser = if a.is_err() { a } else { b };
    let err = loser.unwrap_err();
    assert!(matches!(
        err.source,
        DomainError::InsufficientStock { .. } | DomainError::Conflict { .. }
    ));
}
