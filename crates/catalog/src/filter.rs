use serde::{Deserialize, Serialize};

use gearshop_core::{DomainError, DomainResult, ValueObject};

use crate::product::Product;

/// Result ordering for a catalog query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    None,
    PriceAscending,
    PriceDescending,
}

/// A catalog filter request. All present predicates are ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match against the product name.
    pub search: Option<String>,
    /// Category membership (logical OR across the given tags).
    pub categories: Option<Vec<String>>,
    /// Inclusive lower price bound, smallest currency unit.
    pub min_price_cents: Option<i64>,
    /// Inclusive upper price bound, smallest currency unit.
    pub max_price_cents: Option<i64>,
    pub sort: SortOrder,
}

impl ProductFilter {
    /// Check the numeric bounds for malformed input.
    pub fn validate(&self) -> DomainResult<()> {
        if matches!(self.min_price_cents, Some(min) if min < 0) {
            return Err(DomainError::invalid_filter("min price cannot be negative"));
        }
        if matches!(self.max_price_cents, Some(max) if max < 0) {
            return Err(DomainError::invalid_filter("max price cannot be negative"));
        }
        if let (Some(min), Some(max)) = (self.min_price_cents, self.max_price_cents) {
            if min > max {
                return Err(DomainError::invalid_filter(format!(
                    "min price {min} exceeds max price {max}"
                )));
            }
        }
        Ok(())
    }

    /// Pure predicate: does `product` satisfy every present criterion?
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }

        if let Some(categories) = &self.categories {
            if !categories.iter().any(|c| c == &product.category) {
                return false;
            }
        }

        if matches!(self.min_price_cents, Some(min) if product.price_cents < min) {
            return false;
        }
        if matches!(self.max_price_cents, Some(max) if product.price_cents > max) {
            return false;
        }

        true
    }
}

impl ValueObject for ProductFilter {}

/// Order `products` by the requested sort key.
///
/// The sort is stable: ties keep whatever order the caller supplied, which
/// for store results is natural storage order.
pub fn sort_by_price(products: &mut [Product], sort: SortOrder) {
    match sort {
        SortOrder::None => {}
        SortOrder::PriceAscending => products.sort_by_key(|p| p.price_cents),
        SortOrder::PriceDescending => {
            products.sort_by_key(|p| std::cmp::Reverse(p.price_cents))
        }
    }
}
