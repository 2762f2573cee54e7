use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gearshop_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

/// A catalog product record.
///
/// `stock` is the sole mutable quantity governed by the reservation protocol;
/// everything else changes only through catalog-management patches. `name`
/// and `price_cents` are snapshotted into cart lines at add-time, so edits
/// here never retroactively change an existing cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price_cents: i64,
    /// Units on hand. Never negative.
    pub stock: i64,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a product record, enforcing the stock/price invariants.
    ///
    /// Richer catalog validation (SKU formats, image URLs, ...) belongs to
    /// the catalog-management callers, not here.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price_cents: i64,
        stock: i64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if price_cents < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }

        let now = Utc::now();
        Ok(Self {
            id: ProductId::new(),
            name,
            category: category.into(),
            price_cents,
            stock,
            description: None,
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update of a product: a field is written only when present.
///
/// This is the explicit "patch" shape that replaces building an update
/// document dynamically from whatever request fields happen to exist.
/// `stock` here is a catalog-management restock/correction; reservations
/// never go through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price_cents.is_none()
            && self.stock.is_none()
            && self.description.is_none()
            && self.images.is_none()
    }

    /// Validate the patch against the product invariants.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if matches!(self.price_cents, Some(p) if p < 0) {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if matches!(self.stock, Some(s) if s < 0) {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        Ok(())
    }

    /// Apply the present fields to `product`, refreshing `updated_at`.
    ///
    /// Callers validate first; application itself cannot fail.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(price_cents) = self.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
        product.updated_at = Utc::now();
    }
}

impl ValueObject for ProductPatch {}
