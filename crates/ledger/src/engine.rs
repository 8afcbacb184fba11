//! The stock-ledger transaction engine.
//!
//! The engine is the sole owner of stock mutation. Every operation follows the
//! same discipline: compute and validate every consequence against the variant
//! store *before* the document store is touched or any quantity is written.
//! Since the underlying stores offer no cross-aggregate transactions, that
//! ordering is what makes a rejected operation leave no partial state behind.

use std::collections::BTreeMap;

use tracing::{info, instrument, warn};

use stockroom_catalog::{Product, Variant};
use stockroom_core::{DocumentId, DomainError, DomainResult, ExpectedVersion, VariantId};

use crate::document::{Document, DocumentType, DraftDocument};
use crate::ports::{DocumentStore, StoreError, VariantStore};
use crate::view::{DocumentLineView, DocumentView};

/// Conflicting stock writes are retried this many times before the operation
/// surfaces a retryable repository error.
pub const MAX_CAS_RETRIES: u32 = 5;

/// Application service coordinating documents and variant stock.
///
/// Constructed with explicit store handles; owns no persistence itself.
pub struct StockLedger<V, D> {
    variants: V,
    documents: D,
}

impl<V, D> StockLedger<V, D>
where
    V: VariantStore,
    D: DocumentStore,
{
    pub fn new(variants: V, documents: D) -> Self {
        Self { variants, documents }
    }

    // --- Transactions ---

    /// Record an inbound receipt and add its quantities to stock.
    #[instrument(skip(self, draft), fields(doc_date = %draft.doc_date, lines = draft.lines.len()))]
    pub fn create_inbound(&self, draft: DraftDocument) -> DomainResult<Document> {
        self.expect_type(&draft, DocumentType::Inbound)?;
        self.validate_lines(&draft)?;

        // Every referenced variant must exist before anything persists.
        for line in &draft.lines {
            self.require_variant(line.variant_id)?;
        }

        let doc = self.documents.create(draft)?;

        for line in &doc.lines {
            let added = line.quantity;
            self.apply_delta(line.variant_id, added, move |v| {
                DomainError::rule(format!(
                    "inbound could not add stock: {} (on hand: {}, change: {})",
                    v.display_name(),
                    v.stock_qty,
                    added
                ))
            })?;
        }

        info!(document_id = %doc.id, lines = doc.lines.len(), "inbound document persisted, stock added");
        Ok(doc)
    }

    /// Record an outbound shipment and subtract its quantities from stock.
    ///
    /// Two phases: first every line is checked for existence and sufficiency,
    /// then — only if all of them pass — the document persists and stock is
    /// decremented. Sufficiency is re-validated at commit time against the
    /// variant version each write is pinned to, so two callers cannot both
    /// pass the pre-check against the same stock level and both commit.
    #[instrument(skip(self, draft), fields(doc_date = %draft.doc_date, lines = draft.lines.len()))]
    pub fn create_outbound(&self, draft: DraftDocument) -> DomainResult<Document> {
        self.expect_type(&draft, DocumentType::Outbound)?;
        self.validate_lines(&draft)?;

        // Pre-check phase: inspect every line before any mutation begins.
        for line in &draft.lines {
            let variant = self.require_variant(line.variant_id)?;
            if variant.stock_qty < line.quantity {
                return Err(DomainError::out_of_stock(
                    variant.display_name(),
                    variant.stock_qty,
                    line.quantity,
                ));
            }
        }

        // Commit phase.
        let doc = self.documents.create(draft)?;

        for line in &doc.lines {
            let requested = line.quantity;
            self.apply_delta(line.variant_id, -requested, move |v| {
                DomainError::out_of_stock(v.display_name(), v.stock_qty, requested)
            })?;
        }

        info!(document_id = %doc.id, lines = doc.lines.len(), "outbound document persisted, stock subtracted");
        Ok(doc)
    }

    /// Record a stock-count adjustment; line quantities are signed deltas
    /// (positive = overage, negative = shortage).
    ///
    /// Deltas naming the same variant are netted into one, and every resulting
    /// quantity is validated before the document persists or any variant is
    /// written — the same all-or-nothing shape as the outbound path.
    #[instrument(skip(self, draft), fields(doc_date = %draft.doc_date, lines = draft.lines.len()))]
    pub fn create_adjustment(&self, draft: DraftDocument) -> DomainResult<Document> {
        self.expect_type(&draft, DocumentType::Adjust)?;
        self.validate_lines(&draft)?;

        let deltas = net_deltas(draft.lines.iter().map(|l| (l.variant_id, l.quantity)));

        for (&variant_id, &delta) in &deltas {
            let variant = self.require_variant(variant_id)?;
            if variant.stock_qty + delta < 0 {
                return Err(DomainError::rule(format!(
                    "adjustment would drive stock negative: {} (on hand: {}, change: {})",
                    variant.display_name(),
                    variant.stock_qty,
                    delta
                )));
            }
        }

        let doc = self.documents.create(draft)?;

        for (&variant_id, &delta) in &deltas {
            if delta == 0 {
                continue;
            }
            self.apply_delta(variant_id, delta, move |v| {
                DomainError::rule(format!(
                    "adjustment would drive stock negative: {} (on hand: {}, change: {})",
                    v.display_name(),
                    v.stock_qty,
                    delta
                ))
            })?;
        }

        info!(document_id = %doc.id, lines = doc.lines.len(), "adjustment document persisted");
        Ok(doc)
    }

    /// Delete a document, reversing its stock effect.
    ///
    /// The reversal is computed as one net impact per variant, validated in
    /// full, and only then applied — compute-all, validate-all, mutate-all.
    /// A rollback that would drive any variant negative aborts the whole
    /// deletion: no stock changes and the document stays.
    #[instrument(skip(self), fields(document_id = %id))]
    pub fn delete_document(&self, id: DocumentId) -> DomainResult<()> {
        let doc = self
            .documents
            .document(id)?
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;

        let impacts = rollback_impacts(&doc);

        // Strict pre-check. Only negative impacts can breach the stock floor,
        // but every impacted variant must still exist for the apply phase.
        for (&variant_id, &impact) in &impacts {
            let variant = self.require_variant(variant_id)?;
            if impact < 0 && variant.stock_qty + impact < 0 {
                return Err(DomainError::rule(format!(
                    "rollback would drive stock negative: {} (on hand: {}, rollback subtracts: {})",
                    variant.display_name(),
                    variant.stock_qty,
                    -impact
                )));
            }
        }

        for (&variant_id, &impact) in &impacts {
            if impact == 0 {
                continue;
            }
            self.apply_delta(variant_id, impact, move |v| {
                DomainError::rule(format!(
                    "rollback would drive stock negative: {} (on hand: {}, rollback subtracts: {})",
                    v.display_name(),
                    v.stock_qty,
                    -impact
                ))
            })?;
        }

        self.documents.delete(id)?;
        info!(document_id = %id, "document deleted, stock rolled back");
        Ok(())
    }

    // --- Queries ---

    pub fn products(&self) -> DomainResult<Vec<Product>> {
        Ok(self.variants.products()?)
    }

    pub fn variants_for_product(&self, product_id: stockroom_core::ProductId) -> DomainResult<Vec<Variant>> {
        Ok(self.variants.variants_for_product(product_id)?)
    }

    /// All variants at or below their safety-stock threshold.
    ///
    /// O(products × variants); inventories of this kind are small. Scaling
    /// this wants a store-level filtered query, not an engine change.
    pub fn low_stock_variants(&self) -> DomainResult<Vec<Variant>> {
        let mut low = Vec::new();
        for product in self.variants.products()? {
            for variant in self.variants.variants_for_product(product.id)? {
                if variant.is_low_stock() {
                    low.push(variant);
                }
            }
        }
        Ok(low)
    }

    /// Document headers, optionally filtered by type. Lines not populated.
    pub fn documents(&self, doc_type: Option<DocumentType>) -> DomainResult<Vec<Document>> {
        Ok(self.documents.documents(doc_type)?)
    }

    /// One document with its lines populated.
    pub fn document(&self, id: DocumentId) -> DomainResult<Option<Document>> {
        Ok(self.documents.document(id)?)
    }

    /// Display projection of one document, with variant SKU and spec joined
    /// onto each line. A variant deleted since the document was written
    /// renders as a placeholder rather than failing the view.
    pub fn document_view(&self, id: DocumentId) -> DomainResult<DocumentView> {
        let doc = self
            .documents
            .document(id)?
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;

        let mut lines = Vec::with_capacity(doc.lines.len());
        for line in &doc.lines {
            let variant = self.variants.variant(line.variant_id)?;
            if variant.is_none() {
                warn!(variant_id = %line.variant_id, "document line references a missing variant");
            }
            lines.push(DocumentLineView::project(line, variant.as_ref()));
        }

        Ok(DocumentView::assemble(&doc, lines))
    }

    // --- Internals ---

    fn expect_type(&self, draft: &DraftDocument, expected: DocumentType) -> DomainResult<()> {
        if draft.doc_type != expected {
            return Err(DomainError::invalid_document_type(format!(
                "expected {expected}, got {}",
                draft.doc_type
            )));
        }
        Ok(())
    }

    fn validate_lines(&self, draft: &DraftDocument) -> DomainResult<()> {
        for line in &draft.lines {
            match draft.doc_type {
                DocumentType::Inbound | DocumentType::Outbound => {
                    if line.quantity <= 0 {
                        return Err(DomainError::validation(format!(
                            "{} line quantity must be positive (variant {})",
                            draft.doc_type, line.variant_id
                        )));
                    }
                }
                DocumentType::Adjust => {
                    if line.quantity == 0 {
                        return Err(DomainError::validation(format!(
                            "adjustment delta cannot be zero (variant {})",
                            line.variant_id
                        )));
                    }
                }
            }

            // Line amounts must fit signed 64-bit arithmetic.
            let amount = i64::try_from(line.unit_price)
                .ok()
                .and_then(|price| line.quantity.checked_mul(price));
            if amount.is_none() {
                return Err(DomainError::validation(format!(
                    "line amount overflows (variant {})",
                    line.variant_id
                )));
            }
        }
        Ok(())
    }

    fn require_variant(&self, id: VariantId) -> DomainResult<Variant> {
        self.variants
            .variant(id)?
            .ok_or_else(|| DomainError::not_found(format!("variant {id}")))
    }

    /// Apply one signed delta to a variant through a compare-and-swap loop.
    ///
    /// Each attempt re-fetches the variant, re-validates the stock floor
    /// against the freshly read quantity (producing the caller's error kind
    /// on shortfall), and writes pinned to the version that was read. A
    /// conflicting write from another operation retries; persistent conflict
    /// surfaces as a retryable repository error instead of blocking.
    fn apply_delta<F>(&self, variant_id: VariantId, delta: i64, shortfall: F) -> DomainResult<()>
    where
        F: Fn(&Variant) -> DomainError,
    {
        for attempt in 1..=MAX_CAS_RETRIES {
            let mut variant = self.require_variant(variant_id)?;
            if variant.stock_qty + delta < 0 {
                return Err(shortfall(&variant));
            }

            let expected = ExpectedVersion::Exact(variant.version);
            variant.adjust_stock(delta)?;

            match self.variants.update_variant(&variant, expected) {
                Ok(()) => return Ok(()),
                Err(StoreError::Conflict(msg)) => {
                    warn!(variant_id = %variant_id, attempt, %msg, "conflicting stock write, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::repository(format!(
            "variant {variant_id}: gave up after {MAX_CAS_RETRIES} conflicting stock writes"
        )))
    }
}

/// Net stock delta required to reverse a document, one entry per variant.
///
/// Lines naming the same variant are summed into a single impact; the map
/// iterates in ascending variant-id order, which fixes the order mutations
/// are applied in.
pub fn rollback_impacts(doc: &Document) -> BTreeMap<VariantId, i64> {
    net_deltas(doc.lines.iter().map(|line| {
        let delta = match doc.doc_type {
            // Undo an addition.
            DocumentType::Inbound => -line.quantity,
            // Undo a subtraction.
            DocumentType::Outbound => line.quantity,
            // Undo the signed delta.
            DocumentType::Adjust => -line.quantity,
        };
        (line.variant_id, delta)
    }))
}

fn net_deltas(pairs: impl IntoIterator<Item = (VariantId, i64)>) -> BTreeMap<VariantId, i64> {
    let mut deltas = BTreeMap::new();
    for (variant_id, delta) in pairs {
        *deltas.entry(variant_id).or_insert(0) += delta;
    }
    deltas
}
