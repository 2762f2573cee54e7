//! Stock reservation protocol.
//!
//! Every stock decrement in the system (cart adds and checkout lines alike)
//! goes through [`StockReserver::reserve`]. The protocol is:
//!
//! ```text
//! 1. Read current stock (missing product -> ProductNotFound)
//! 2. requested > stock  -> InsufficientStock { available } (no mutation)
//! 3. Conditionally swap stock to (stock - requested), guarded on the
//!    value read in step 1
//! 4. Guard rejected (a concurrent reserver moved stock) -> back off and
//!    retry from step 1, up to the policy's attempt budget -> Conflict
//! ```
//!
//! A plain read-compare-write is not acceptable here: two callers can both
//! pass the comparison against the same pre-decrement value and jointly
//! overdraw. The conditional swap in step 3 is what linearizes reservations
//! per product. No in-process lock is held across any store call: several
//! server processes may share the store, so the store's conditional update is
//! the only concurrency-control mechanism.

use std::time::Duration;

use gearshop_core::{DomainError, DomainResult, ProductId};

use crate::store::{CatalogStore, StockWrite};

/// Retry budget and backoff for reservation attempts.
///
/// Exponential backoff with a cap keeps a burst of competing reservers from
/// hammering the store in lockstep. Terminal outcomes (`ProductNotFound`,
/// `InsufficientStock`) never consume retries.
#[derive(Debug, Clone)]
pub struct ReservationPolicy {
    /// Maximum conditional-write attempts before giving up with `Conflict`.
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub backoff_base: Duration,
    /// Upper bound on any single delay.
    pub backoff_cap: Duration,
}

impl ReservationPolicy {
    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = 2u64.saturating_pow(attempt);
        let delay =
            Duration::from_millis((self.backoff_base.as_millis() as u64).saturating_mul(multiplier));
        std::cmp::min(delay, self.backoff_cap)
    }
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: Duration::from_millis(10),
            backoff_cap: Duration::from_millis(200),
        }
    }
}

/// A successful reservation: the quantity now held and the stock remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Reservation {
    pub product_id: ProductId,
    pub quantity: i64,
    pub remaining_stock: i64,
}

/// The reservation protocol, bound to a catalog store handle.
#[derive(Debug, Clone)]
pub struct StockReserver<S> {
    store: S,
    policy: ReservationPolicy,
}

impl<S> StockReserver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: ReservationPolicy::default(),
        }
    }

    pub fn with_policy(store: S, policy: ReservationPolicy) -> Self {
        Self { store, policy }
    }
}

impl<S: CatalogStore> StockReserver<S> {
    /// Validate `quantity` against available stock and atomically decrement.
    ///
    /// `ProductNotFound` and `InsufficientStock` are terminal; `Conflict`
    /// after the attempt budget is transient and eligible for caller-level
    /// retry with backoff. Store failures surface as `StoreUnavailable`.
    pub async fn reserve(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<Reservation> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "reservation quantity must be positive, got {quantity}"
            )));
        }

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.policy.delay_for_attempt(attempt - 1)).await;
            }

            let product = self
                .store
                .fetch_product(product_id)
                .await?
                .ok_or_else(|| DomainError::not_found(product_id))?;

            if quantity > product.stock {
                return Err(DomainError::insufficient_stock(
                    product_id,
                    quantity,
                    product.stock,
                ));
            }

            let remaining = product.stock - quantity;
            match self
                .store
                .compare_and_swap_stock(product_id, product.stock, remaining)
                .await?
            {
                StockWrite::Applied => {
                    return Ok(Reservation {
                        product_id,
                        quantity,
                        remaining_stock: remaining,
                    });
                }
                StockWrite::Rejected => {
                    tracing::debug!(
                        %product_id,
                        attempt,
                        "stock moved during reservation, retrying"
                    );
                }
                StockWrite::Missing => {
                    return Err(DomainError::not_found(product_id));
                }
            }
        }

        tracing::warn!(
            %product_id,
            attempts = self.policy.max_attempts,
            "reservation lost every conditional write, giving up"
        );
        Err(DomainError::conflict(product_id, self.policy.max_attempts))
    }
}
