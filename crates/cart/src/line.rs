use serde::{Deserialize, Serialize};

use gearshop_catalog::Product;
use gearshop_core::{ProductId, ValueObject};

/// One aggregated cart entry: total requested quantity of one product.
///
/// `name` and `price_cents` are snapshots taken when the line was created or
/// last merged. They deliberately do not track later catalog edits: a cart
/// reflects price-at-add-time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    /// Snapshot a product into a cart line for `quantity` units.
    pub fn snapshot(product: &Product, quantity: i64) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price_cents: product.price_cents,
            quantity,
        }
    }

    /// Line subtotal at the snapshotted price.
    pub fn subtotal_cents(&self) -> i64 {
        self.price_cents.saturating_mul(self.quantity)
    }
}

impl ValueObject for CartLine {}

/// A cart: at most one line per distinct product.
///
/// Repeat additions of the same product merge by summing quantity and
/// refreshing the name/price snapshot. This is the law both cart store
/// implementations must honor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_for(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Merge `incoming` into the cart and return the post-merge line.
    ///
    /// An existing line for the same product is updated in place: quantity
    /// becomes the sum, name/price take the incoming snapshot. Otherwise the
    /// line is appended.
    pub fn merge(&mut self, incoming: CartLine) -> &CartLine {
        match self
            .lines
            .iter_mut()
            .position(|l| l.product_id == incoming.product_id)
        {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity += incoming.quantity;
                line.name = incoming.name;
                line.price_cents = incoming.price_cents;
                &self.lines[idx]
            }
            None => {
                self.lines.push(incoming);
                self.lines.last().expect("just pushed")
            }
        }
    }

    /// Cart total at the snapshotted prices.
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::subtotal_cents).sum()
    }
}
