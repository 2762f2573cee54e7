//! Catalog store boundary.
//!
//! This module defines an infrastructure-facing abstraction over the document
//! store holding product records and persisted carts, without making storage
//! assumptions. The one non-CRUD primitive is `compare_and_swap_stock`: the
//! conditional update every stock mutation in the system funnels through.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryCartStore, InMemoryCatalogStore};
pub use postgres::{PostgresCartStore, PostgresCatalogStore};
pub use r#trait::{CartStore, CatalogStore, StockWrite, StoreError};
