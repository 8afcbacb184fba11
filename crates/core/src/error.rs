//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, stock rules). Store implementations map their own failures
/// into `Repository`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A document of the wrong type was handed to a type-specific operation.
    #[error("invalid document type: {0}")]
    InvalidDocumentType(String),

    /// A referenced variant or document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An outbound line asked for more than the variant has on hand.
    #[error("out of stock: {variant} (on hand: {on_hand}, requested: {requested})")]
    OutOfStock {
        variant: String,
        on_hand: i64,
        requested: i64,
    },

    /// A general business rule was breached (e.g. an operation would drive
    /// stock negative).
    #[error("business rule violated: {0}")]
    RuleViolation(String),

    /// A value failed validation (e.g. malformed input, zero quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A uniqueness constraint was breached (e.g. SKU already exists).
    #[error("duplicate entity: {0}")]
    Duplicate(String),

    /// A failure surfaced by a store port (connectivity, constraint, I/O).
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError {
    pub fn invalid_document_type(msg: impl Into<String>) -> Self {
        Self::InvalidDocumentType(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn out_of_stock(variant: impl Into<String>, on_hand: i64, requested: i64) -> Self {
        Self::OutOfStock {
            variant: variant.into(),
            on_hand,
            requested,
        }
    }

    pub fn rule(msg: impl Into<String>) -> Self {
        Self::RuleViolation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}
