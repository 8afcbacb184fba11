//! Read-model projections for display.
//!
//! The persisted document shapes carry variant *identifiers* only. List and
//! detail screens want the SKU and spec next to each line, so the engine
//! assembles these explicit projection types instead of attaching ad hoc
//! fields onto the persisted records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockroom_catalog::Variant;
use stockroom_core::{DocumentId, LineId, VariantId};

use crate::document::{Document, DocumentLine, DocumentType};

/// One document line joined with its variant's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLineView {
    pub id: LineId,
    pub variant_id: VariantId,
    pub sku: String,
    pub display_name: String,
    pub quantity: i64,
    pub unit_price: u64,
    pub subtotal: i64,
}

impl DocumentLineView {
    /// Join a persisted line with its variant; a vanished variant renders as
    /// a placeholder so old documents stay viewable.
    pub fn project(line: &DocumentLine, variant: Option<&Variant>) -> Self {
        let (sku, display_name) = match variant {
            Some(v) => (v.sku.clone(), v.display_name()),
            None => ("(deleted)".to_string(), "(deleted variant)".to_string()),
        };

        Self {
            id: line.id,
            variant_id: line.variant_id,
            sku,
            display_name,
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal(),
        }
    }
}

/// A full document ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentView {
    pub id: DocumentId,
    pub doc_type: DocumentType,
    pub doc_date: NaiveDate,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<DocumentLineView>,
    pub total_amount: i64,
}

impl DocumentView {
    pub fn assemble(doc: &Document, lines: Vec<DocumentLineView>) -> Self {
        let total_amount = lines.iter().map(|l| l.subtotal).fold(0, i64::saturating_add);
        Self {
            id: doc.id,
            doc_type: doc.doc_type,
            doc_date: doc.doc_date,
            note: doc.note.clone(),
            created_at: doc.created_at,
            lines,
            total_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::ProductId;

    #[test]
    fn projection_joins_variant_display_fields() {
        let variant = Variant::new(
            VariantId::new(),
            ProductId::new(),
            "M",
            "Black",
            Some("TS-M-BLK".to_string()),
        )
        .unwrap();
        let line = DocumentLine {
            id: LineId::new(),
            variant_id: variant.id,
            quantity: 3,
            unit_price: 2500,
        };

        let view = DocumentLineView::project(&line, Some(&variant));
        assert_eq!(view.sku, "TS-M-BLK");
        assert_eq!(view.display_name, "M / Black");
        assert_eq!(view.subtotal, 7500);
    }

    #[test]
    fn missing_variant_projects_placeholders() {
        let line = DocumentLine {
            id: LineId::new(),
            variant_id: VariantId::new(),
            quantity: 1,
            unit_price: 100,
        };

        let view = DocumentLineView::project(&line, None);
        assert_eq!(view.sku, "(deleted)");
        assert_eq!(view.display_name, "(deleted variant)");
    }
}
