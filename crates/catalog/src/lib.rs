//! Product catalog domain: the product record, partial updates, and the
//! pure filter/sort logic behind the query engine.

pub mod filter;
pub mod product;

pub use filter::{ProductFilter, SortOrder, sort_by_price};
pub use product::{Product, ProductPatch};
