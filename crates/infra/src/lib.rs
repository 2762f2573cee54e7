//! Infrastructure layer: the catalog store boundary and the store-coupled
//! services built on top of it.
//!
//! - `store`: the document-store port (`CatalogStore`, `CartStore`) with
//!   in-memory (dev/test) and Postgres implementations.
//! - `query`: the catalog query engine (filtered product lookups + the
//!   catalog-management passthroughs).
//! - `reservation`: the stock reservation protocol, the conditional-update
//!   discipline that keeps concurrent reservations from overdrawing stock.
//! - `cart_service`: the cart aggregator (reserve-then-merge).
//! - `checkout`: the checkout orchestrator (per-line reservation, first
//!   failure stops, no cross-line rollback).

pub mod cart_service;
pub mod checkout;
pub mod query;
pub mod reservation;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use cart_service::CartAggregator;
pub use checkout::{CheckoutError, CheckoutLine, CheckoutOrchestrator, CheckoutReceipt};
pub use query::ProductCatalog;
pub use reservation::{Reservation, ReservationPolicy, StockReserver};
pub use store::{CartStore, CatalogStore, StockWrite, StoreError};
