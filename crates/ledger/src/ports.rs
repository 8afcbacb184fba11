//! Store ports: the engine's only reach into persistence.
//!
//! The engine depends on two narrow capability sets — a variant store and a
//! document store — and makes no assumption about what backs them (relational,
//! file-based, in-memory). Implementations live outside this crate.

use std::sync::Arc;
use thiserror::Error;

use stockroom_catalog::{Product, Variant};
use stockroom_core::{DocumentId, DomainError, ExpectedVersion, ProductId, VariantId};

use crate::document::{Document, DocumentType, DraftDocument};

/// Store-layer failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version did not match the writer's expectation. Retryable.
    #[error("version conflict: {0}")]
    Conflict(String),

    /// A uniqueness constraint was breached (e.g. SKU already exists).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend failure: connectivity, I/O, poisoned lock.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => DomainError::repository(format!("version conflict: {msg}")),
            StoreError::Duplicate(msg) => DomainError::duplicate(msg),
            StoreError::NotFound(msg) => DomainError::not_found(msg),
            StoreError::Backend(msg) => DomainError::repository(msg),
        }
    }
}

/// Read/write access to variant records (and the product list they hang off).
///
/// `update_variant` is the single write entry point for stock quantities. It
/// must compare the stored version against `expected`, fail with
/// [`StoreError::Conflict`] on mismatch, and bump the version on success —
/// that check is what makes the engine's read-modify-write sequences safe to
/// interleave.
pub trait VariantStore: Send + Sync {
    /// List every product in the catalog.
    fn products(&self) -> Result<Vec<Product>, StoreError>;

    /// Fetch a variant by id; `None` when it does not exist.
    fn variant(&self, id: VariantId) -> Result<Option<Variant>, StoreError>;

    /// Fetch a variant by its SKU code; `None` when it does not exist.
    fn variant_by_sku(&self, sku: &str) -> Result<Option<Variant>, StoreError>;

    /// List all variants of one product.
    fn variants_for_product(&self, product_id: ProductId) -> Result<Vec<Variant>, StoreError>;

    /// Persist a mutated variant, subject to the version expectation.
    fn update_variant(&self, variant: &Variant, expected: ExpectedVersion)
    -> Result<(), StoreError>;
}

/// Create/read/list/delete access to documents and their lines.
pub trait DocumentStore: Send + Sync {
    /// Persist a draft as one unit: either the header and all lines are
    /// stored (with assigned identifiers), or nothing is.
    fn create(&self, draft: DraftDocument) -> Result<Document, StoreError>;

    /// Fetch a document with its lines populated; `None` when absent.
    fn document(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// List document headers, optionally filtered by type.
    ///
    /// Lines are deliberately NOT populated — list queries stay cheap, and
    /// callers needing detail fetch one document by id.
    fn documents(&self, doc_type: Option<DocumentType>) -> Result<Vec<Document>, StoreError>;

    /// Remove a document header and its lines.
    fn delete(&self, id: DocumentId) -> Result<(), StoreError>;
}

impl<S> VariantStore for Arc<S>
where
    S: VariantStore + ?Sized,
{
    fn products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).products()
    }

    fn variant(&self, id: VariantId) -> Result<Option<Variant>, StoreError> {
        (**self).variant(id)
    }

    fn variant_by_sku(&self, sku: &str) -> Result<Option<Variant>, StoreError> {
        (**self).variant_by_sku(sku)
    }

    fn variants_for_product(&self, product_id: ProductId) -> Result<Vec<Variant>, StoreError> {
        (**self).variants_for_product(product_id)
    }

    fn update_variant(
        &self,
        variant: &Variant,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        (**self).update_variant(variant, expected)
    }
}

impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    fn create(&self, draft: DraftDocument) -> Result<Document, StoreError> {
        (**self).create(draft)
    }

    fn document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        (**self).document(id)
    }

    fn documents(&self, doc_type: Option<DocumentType>) -> Result<Vec<Document>, StoreError> {
        (**self).documents(doc_type)
    }

    fn delete(&self, id: DocumentId) -> Result<(), StoreError> {
        (**self).delete(id)
    }
}
