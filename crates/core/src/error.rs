//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is terminal for the operation that raised it; nothing in the
/// domain retries. Recovery policy belongs to whoever called the store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// No product with this sku exists in the store.
    #[error("product does not exist in this store (sku={sku})")]
    UnexistingProduct { sku: String },

    /// A product with this sku already exists in the store.
    #[error("product already exists in this store (sku={sku})")]
    AlreadyExistingProduct { sku: String },

    /// The unit is unknown, or not registered for the product.
    #[error("unit {unit} not supported by product ({product})")]
    UnsupportedUnit { unit: String, product: String },

    /// The change type is not one of increase/decrease/adjust.
    #[error("unsupported change type: {0}")]
    UnsupportedChangeType(String),

    /// Negative (or non-finite) quantity, or a decrease below zero.
    #[error("invalid quantity: {0}")]
    InvalidQty(String),

    /// Conversion factors must be finite and strictly positive.
    #[error("conversion factor must be positive, got {0}")]
    InvalidConversionFactor(f64),

    /// The unit already has a conversion entry for this product.
    #[error("unit {unit} is already supported by product ({product})")]
    DuplicateUnit { unit: String, product: String },

    /// A batch addressed to another store.
    #[error("batch targets store {requested} but was submitted to store {actual}")]
    StoreIdentityMismatch { requested: String, actual: String },

    /// A value failed validation (e.g. empty sku).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn unexisting_product(sku: impl Into<String>) -> Self {
        Self::UnexistingProduct { sku: sku.into() }
    }

    pub fn already_existing_product(sku: impl Into<String>) -> Self {
        Self::AlreadyExistingProduct { sku: sku.into() }
    }

    pub fn unsupported_unit(unit: impl ToString, product: impl Into<String>) -> Self {
        Self::UnsupportedUnit {
            unit: unit.to_string(),
            product: product.into(),
        }
    }

    pub fn duplicate_unit(unit: impl ToString, product: impl Into<String>) -> Self {
        Self::DuplicateUnit {
            unit: unit.to_string(),
            product: product.into(),
        }
    }

    pub fn invalid_qty(msg: impl Into<String>) -> Self {
        Self::InvalidQty(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Validate a caller-supplied quantity: finite and not negative.
    pub fn check_qty(qty: f64) -> DomainResult<()> {
        if !qty.is_finite() {
            return Err(Self::invalid_qty(format!("quantity must be finite ({qty})")));
        }
        if qty < 0.0 {
            return Err(Self::invalid_qty(format!("tried to pass in negative qty ({qty})")));
        }
        Ok(())
    }
}
