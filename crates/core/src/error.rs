//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Business outcomes (`ProductNotFound`, `InsufficientStock`) are terminal:
/// callers must not retry them with the same request. `Conflict` is transient
/// and only surfaces after the reservation protocol exhausts its internal
/// retry budget. `StoreUnavailable` wraps any storage failure and is never
/// swallowed or converted into a false success.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The referenced product does not exist in the catalog.
    #[error("product {product_id} not found")]
    ProductNotFound { product_id: ProductId },

    /// Requested quantity exceeds the currently available stock.
    ///
    /// Carries the available quantity so callers can react programmatically
    /// (adjust the request, back off, surface to the client).
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// A conditional stock write kept losing to concurrent reservers and the
    /// retry budget ran out. Eligible for caller-level retry with backoff.
    #[error("reservation conflict on {product_id} after {attempts} attempts")]
    Conflict { product_id: ProductId, attempts: u32 },

    /// A catalog filter had malformed bounds (negative or inverted range).
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A value failed validation (e.g. non-positive quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The catalog store failed (connectivity, IO). Propagated unchanged.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DomainError {
    pub fn not_found(product_id: ProductId) -> Self {
        Self::ProductNotFound { product_id }
    }

    pub fn insufficient_stock(product_id: ProductId, requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            product_id,
            requested,
            available,
        }
    }

    pub fn conflict(product_id: ProductId, attempts: u32) -> Self {
        Self::Conflict {
            product_id,
            attempts,
        }
    }

    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Whether callers may retry the same request (transient failures only).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::Conflict { .. } | DomainError::StoreUnavailable(_)
        )
    }
}
