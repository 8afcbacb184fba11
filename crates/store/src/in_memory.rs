use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::{debug, info};

use stockroom_catalog::{Product, Variant};
use stockroom_core::{DocumentId, ExpectedVersion, LineId, ProductId, VariantId};
use stockroom_ledger::document::{Document, DocumentLine, DocumentType, DraftDocument};
use stockroom_ledger::ports::{DocumentStore, StoreError, VariantStore};

/// In-memory implementation of both store ports.
///
/// Intended for tests/dev. Not optimized for performance. Also carries the
/// catalog write surface (insert/delete/search) used for seeding; those are
/// inherent methods, deliberately outside the engine's ports.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    products: RwLock<HashMap<ProductId, Product>>,
    variants: RwLock<HashMap<VariantId, Variant>>,
    documents: RwLock<HashMap<DocumentId, Document>>,
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Catalog surface (seeding/tests/dev) ---

    pub fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        if products.contains_key(&product.id) {
            return Err(StoreError::Duplicate(format!("product {}", product.id)));
        }
        info!(product_id = %product.id, name = %product.name, "product added");
        products.insert(product.id, product);
        Ok(())
    }

    pub fn insert_variant(&self, variant: Variant) -> Result<(), StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        if !products.contains_key(&variant.product_id) {
            return Err(StoreError::NotFound(format!(
                "product {}",
                variant.product_id
            )));
        }
        drop(products);

        let mut variants = self.variants.write().map_err(|_| poisoned())?;
        if variants.contains_key(&variant.id) {
            return Err(StoreError::Duplicate(format!("variant {}", variant.id)));
        }
        if variants.values().any(|v| v.sku == variant.sku) {
            return Err(StoreError::Duplicate(format!("SKU {}", variant.sku)));
        }
        info!(variant_id = %variant.id, sku = %variant.sku, "variant added");
        variants.insert(variant.id, variant);
        Ok(())
    }

    /// Remove a product and, in cascade, all of its variants.
    pub fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        if products.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("product {id}")));
        }
        drop(products);

        let mut variants = self.variants.write().map_err(|_| poisoned())?;
        variants.retain(|_, v| v.product_id != id);
        info!(product_id = %id, "product deleted (variants cascaded)");
        Ok(())
    }

    /// Case-insensitive substring search over name/brand/category/description.
    pub fn search_products(&self, keyword: &str) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut found: Vec<Product> = products
            .values()
            .filter(|p| p.matches_keyword(keyword))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

impl VariantStore for InMemoryInventory {
    fn products(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut all: Vec<Product> = products.values().cloned().collect();
        // Newest first, as list screens expect.
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn variant(&self, id: VariantId) -> Result<Option<Variant>, StoreError> {
        let variants = self.variants.read().map_err(|_| poisoned())?;
        Ok(variants.get(&id).cloned())
    }

    fn variant_by_sku(&self, sku: &str) -> Result<Option<Variant>, StoreError> {
        let variants = self.variants.read().map_err(|_| poisoned())?;
        Ok(variants.values().find(|v| v.sku == sku).cloned())
    }

    fn variants_for_product(&self, product_id: ProductId) -> Result<Vec<Variant>, StoreError> {
        let variants = self.variants.read().map_err(|_| poisoned())?;
        let mut found: Vec<Variant> = variants
            .values()
            .filter(|v| v.product_id == product_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(found)
    }

    fn update_variant(
        &self,
        variant: &Variant,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let mut variants = self.variants.write().map_err(|_| poisoned())?;
        let stored = variants
            .get_mut(&variant.id)
            .ok_or_else(|| StoreError::NotFound(format!("variant {}", variant.id)))?;

        if !expected.matches(stored.version) {
            return Err(StoreError::Conflict(format!(
                "variant {}: expected {:?}, found {}",
                variant.id, expected, stored.version
            )));
        }

        let mut updated = variant.clone();
        updated.version = stored.version + 1;
        debug!(variant_id = %updated.id, stock_qty = updated.stock_qty, version = updated.version, "variant updated");
        *stored = updated;
        Ok(())
    }
}

impl DocumentStore for InMemoryInventory {
    fn create(&self, draft: DraftDocument) -> Result<Document, StoreError> {
        let doc = Document {
            id: DocumentId::new(),
            doc_type: draft.doc_type,
            doc_date: draft.doc_date,
            note: draft.note,
            lines: draft
                .lines
                .into_iter()
                .map(|line| DocumentLine {
                    id: LineId::new(),
                    variant_id: line.variant_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
            created_at: Utc::now(),
        };

        // Header and lines live in one record, so the insert is atomic by
        // construction.
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        info!(document_id = %doc.id, lines = doc.lines.len(), "document created");
        documents.insert(doc.id, doc.clone());
        Ok(doc)
    }

    fn document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents.get(&id).cloned())
    }

    fn documents(&self, doc_type: Option<DocumentType>) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        let mut headers: Vec<Document> = documents
            .values()
            .filter(|d| doc_type.is_none_or(|t| d.doc_type == t))
            .map(|d| Document {
                lines: Vec::new(),
                note: d.note.clone(),
                ..*d
            })
            .collect();
        headers.sort_by(|a, b| {
            b.doc_date
                .cmp(&a.doc_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(headers)
    }

    fn delete(&self, id: DocumentId) -> Result<(), StoreError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        if documents.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("document {id}")));
        }
        info!(document_id = %id, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockroom_ledger::document::DraftLine;

    fn store_with_variant() -> (InMemoryInventory, Variant) {
        let store = InMemoryInventory::new();
        let product = Product::new(ProductId::new(), "Air Zoom", "Nike", 12900).unwrap();
        let variant = Variant::new(
            VariantId::new(),
            product.id,
            "US 9.5",
            "Red",
            Some("AZ-95-RED".to_string()),
        )
        .unwrap();
        store.insert_product(product).unwrap();
        store.insert_variant(variant.clone()).unwrap();
        (store, variant)
    }

    #[test]
    fn duplicate_sku_is_rejected() {
        let (store, variant) = store_with_variant();
        let clash = Variant::new(
            VariantId::new(),
            variant.product_id,
            "US 10",
            "Red",
            Some("AZ-95-RED".to_string()),
        )
        .unwrap();

        match store.insert_variant(clash) {
            Err(StoreError::Duplicate(msg)) => assert!(msg.contains("AZ-95-RED")),
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[test]
    fn variant_for_unknown_product_is_rejected() {
        let store = InMemoryInventory::new();
        let orphan =
            Variant::new(VariantId::new(), ProductId::new(), "M", "Black", None).unwrap();

        assert!(matches!(
            store.insert_variant(orphan),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn variant_lookup_by_sku() {
        let (store, variant) = store_with_variant();
        let found = store.variant_by_sku("AZ-95-RED").unwrap().unwrap();
        assert_eq!(found.id, variant.id);
        assert!(store.variant_by_sku("NOPE").unwrap().is_none());
    }

    #[test]
    fn deleting_a_product_cascades_to_its_variants() {
        let (store, variant) = store_with_variant();
        store.delete_product(variant.product_id).unwrap();

        assert!(store.variant(variant.id).unwrap().is_none());
        assert!(store.products().unwrap().is_empty());
    }

    #[test]
    fn update_requires_the_read_version() {
        let (store, mut variant) = store_with_variant();

        variant.stock_qty = 10;
        store
            .update_variant(&variant, ExpectedVersion::Exact(0))
            .unwrap();

        // The same expectation is now stale.
        variant.stock_qty = 20;
        match store.update_variant(&variant, ExpectedVersion::Exact(0)) {
            Err(StoreError::Conflict(_)) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }

        let stored = store.variant(variant.id).unwrap().unwrap();
        assert_eq!(stored.stock_qty, 10);
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn update_of_missing_variant_is_not_found() {
        let store = InMemoryInventory::new();
        let ghost = Variant::new(VariantId::new(), ProductId::new(), "M", "Black", None).unwrap();

        assert!(matches!(
            store.update_variant(&ghost, ExpectedVersion::Any),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn document_listing_strips_lines_and_filters_by_type() {
        let (store, variant) = store_with_variant();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let mut inbound = DraftDocument::new(DocumentType::Inbound, date);
        inbound.add_line(DraftLine::new(variant.id, 5, 1000));
        store.create(inbound).unwrap();

        let outbound = DraftDocument::new(DocumentType::Outbound, date);
        store.create(outbound).unwrap();

        let all = store.documents(None).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|d| d.lines.is_empty()));

        let inbound_only = store.documents(Some(DocumentType::Inbound)).unwrap();
        assert_eq!(inbound_only.len(), 1);
        assert_eq!(inbound_only[0].doc_type, DocumentType::Inbound);
    }

    #[test]
    fn create_assigns_document_and_line_identifiers() {
        let (store, variant) = store_with_variant();
        let mut draft = DraftDocument::new(
            DocumentType::Inbound,
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        );
        draft.add_line(DraftLine::new(variant.id, 5, 1000));
        draft.add_line(DraftLine::new(variant.id, 2, 1000));

        let doc = store.create(draft).unwrap();
        assert_eq!(doc.lines.len(), 2);
        assert_ne!(doc.lines[0].id, doc.lines[1].id);

        let fetched = store.document(doc.id).unwrap().unwrap();
        assert_eq!(fetched, doc);
    }

    #[test]
    fn search_matches_any_descriptive_field() {
        let store = InMemoryInventory::new();
        let runner = Product::new(ProductId::new(), "Air Zoom", "Nike", 12900)
            .unwrap()
            .with_category("Running");
        let boot = Product::new(ProductId::new(), "Chelsea Boot", "Clarks", 9900).unwrap();
        store.insert_product(runner.clone()).unwrap();
        store.insert_product(boot).unwrap();

        let hits = store.search_products("running").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, runner.id);

        assert_eq!(store.search_products("").unwrap().len(), 2);
    }
}
