//! Catalog query engine and catalog-management passthroughs.
//!
//! The engine validates the filter request and delegates the lookup to the
//! store; the CRUD operations are the black-box catalog-management surface
//! the rest of the system consumes. Stock never moves through here except by
//! explicit restock patches.

use gearshop_catalog::{Product, ProductFilter, ProductPatch};
use gearshop_core::{DomainError, DomainResult, ProductId};

use crate::store::CatalogStore;

/// Catalog query/management service, bound to a store handle.
#[derive(Debug, Clone)]
pub struct ProductCatalog<S> {
    store: S,
}

impl<S> ProductCatalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: CatalogStore> ProductCatalog<S> {
    /// Filtered product lookup.
    ///
    /// An empty result is a valid outcome, not an error; the calling layer
    /// decides how to present "no match".
    pub async fn find(&self, filter: &ProductFilter) -> DomainResult<Vec<Product>> {
        filter.validate()?;
        Ok(self.store.find_products(filter).await?)
    }

    pub async fn get(&self, product_id: ProductId) -> DomainResult<Product> {
        self.store
            .fetch_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found(product_id))
    }

    pub async fn create(&self, product: Product) -> DomainResult<Product> {
        self.store.insert_product(product.clone()).await?;
        Ok(product)
    }

    pub async fn update(
        &self,
        product_id: ProductId,
        patch: &ProductPatch,
    ) -> DomainResult<Product> {
        patch.validate()?;
        self.store
            .patch_product(product_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(product_id))
    }

    pub async fn delete(&self, product_id: ProductId) -> DomainResult<Product> {
        self.store
            .delete_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found(product_id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::InMemoryCatalogStore;
    use gearshop_catalog::SortOrder;

    async fn seeded_catalog() -> ProductCatalog<Arc<InMemoryCatalogStore>> {
        let store = Arc::new(InMemoryCatalogStore::new());
        let catalog = ProductCatalog::new(store);

        for (name, category, price) in [
            ("Resistance Band Set", "bands", 2499),
            ("Wrist Band", "accessories", 899),
            ("Kettlebell 16kg", "weights", 5999),
            ("Yoga Mat", "mats", 3499),
            ("Band Loop", "bands", 1299),
        ] {
            catalog
                .create(Product::new(name, category, price, 10).unwrap())
                .await
                .unwrap();
        }

        catalog
    }

    #[tokio::test]
    async fn find_combines_search_price_and_sort() {
        let catalog = seeded_catalog().await;

        let filter = ProductFilter {
            search: Some("band".to_string()),
            min_price_cents: Some(1000),
            max_price_cents: Some(5000),
            sort: SortOrder::PriceAscending,
            ..Default::default()
        };

        let found = catalog.find(&filter).await.unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Band Loop", "Resistance Band Set"]);
    }

    #[tokio::test]
    async fn find_with_no_match_returns_empty_not_error() {
        let catalog = seeded_catalog().await;

        let filter = ProductFilter {
            search: Some("treadmill".to_string()),
            ..Default::default()
        };

        assert!(catalog.find(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_rejects_malformed_bounds() {
        let catalog = seeded_catalog().await;

        let filter = ProductFilter {
            min_price_cents: Some(5000),
            max_price_cents: Some(100),
            ..Default::default()
        };

        assert!(matches!(
            catalog.find(&filter).await.unwrap_err(),
            DomainError::InvalidFilter(_)
        ));
    }

    #[tokio::test]
    async fn identical_filters_return_identical_results() {
        let catalog = seeded_catalog().await;

        let filter = ProductFilter {
            categories: Some(vec!["bands".to_string()]),
            sort: SortOrder::PriceDescending,
            ..Default::default()
        };

        let first = catalog.find(&filter).await.unwrap();
        let second = catalog.find(&filter).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_patches_present_fields_only() {
        let catalog = seeded_catalog().await;
        let product = Product::new("Gloves", "gloves", 1599, 5).unwrap();
        let id = product.id;
        catalog.create(product).await.unwrap();

        let patch = ProductPatch {
            price_cents: Some(1399),
            ..Default::default()
        };
        let updated = catalog.update(id, &patch).await.unwrap();

        assert_eq!(updated.price_cents, 1399);
        assert_eq!(updated.name, "Gloves");
        assert_eq!(updated.stock, 5);
    }

    #[tokio::test]
    async fn get_update_delete_report_not_found() {
        let catalog = seeded_catalog().await;
        let missing = ProductId::new();

        assert!(matches!(
            catalog.get(missing).await.unwrap_err(),
            DomainError::ProductNotFound { .. }
        ));
        assert!(matches!(
            catalog
                .update(missing, &ProductPatch::default())
                .await
                .unwrap_err(),
            DomainError::ProductNotFound { .. }
        ));
        assert!(matches!(
            catalog.delete(missing).await.unwrap_err(),
            DomainError::ProductNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let catalog = seeded_catalog().await;
        let product = Product::new("Jump Rope", "cardio", 999, 3).unwrap();
        let id = product.id;
        catalog.create(product).await.unwrap();

        let removed = catalog.delete(id).await.unwrap();
        assert_eq!(removed.name, "Jump Rope");
        assert!(catalog.get(id).await.is_err());
    }
}
