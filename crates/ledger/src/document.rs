use chrono::{DateTime, NaiveDate, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use stockroom_core::{DocumentId, DomainError, LineId, VariantId};

/// Kind of stock document. Closed set; the wire strings are case-sensitive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    /// Goods received; every line quantity is positive and adds stock.
    Inbound,
    /// Goods shipped; every line quantity is positive and subtracts stock.
    Outbound,
    /// Stock count correction; line quantities are signed deltas.
    Adjust,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Inbound => "INBOUND",
            DocumentType::Outbound => "OUTBOUND",
            DocumentType::Adjust => "ADJUST",
        }
    }
}

impl core::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INBOUND" => Ok(DocumentType::Inbound),
            "OUTBOUND" => Ok(DocumentType::Outbound),
            "ADJUST" => Ok(DocumentType::Adjust),
            other => Err(DomainError::validation(format!(
                "unknown document type: {other}"
            ))),
        }
    }
}

/// A line of a not-yet-submitted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    pub variant_id: VariantId,
    /// Positive for inbound/outbound; signed delta for adjustments.
    pub quantity: i64,
    /// Price per unit in smallest currency unit.
    pub unit_price: u64,
}

impl DraftLine {
    pub fn new(variant_id: VariantId, quantity: i64, unit_price: u64) -> Self {
        Self {
            variant_id,
            quantity,
            unit_price,
        }
    }

    /// Signed line amount, saturated at the i64 bounds.
    ///
    /// The engine rejects drafts whose amounts cannot be represented, so
    /// saturation is only reachable on hand-built records.
    pub fn subtotal(&self) -> i64 {
        saturating_amount(self.quantity, self.unit_price)
    }
}

fn saturating_amount(quantity: i64, unit_price: u64) -> i64 {
    let wide = i128::from(quantity) * i128::from(unit_price);
    wide.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// A document as built by a caller, before submission to the engine.
///
/// Drafts have no identifiers; the document store assigns them on `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftDocument {
    pub doc_type: DocumentType,
    pub doc_date: NaiveDate,
    pub note: String,
    pub lines: Vec<DraftLine>,
}

impl DraftDocument {
    pub fn new(doc_type: DocumentType, doc_date: NaiveDate) -> Self {
        Self {
            doc_type,
            doc_date,
            note: String::new(),
            lines: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn add_line(&mut self, line: DraftLine) {
        self.lines.push(line);
    }

    pub fn total_amount(&self) -> i64 {
        self.lines
            .iter()
            .map(DraftLine::subtotal)
            .fold(0, i64::saturating_add)
    }
}

/// A persisted line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub id: LineId,
    pub variant_id: VariantId,
    pub quantity: i64,
    pub unit_price: u64,
}

impl DocumentLine {
    /// Signed line amount, saturated at the i64 bounds.
    pub fn subtotal(&self) -> i64 {
        saturating_amount(self.quantity, self.unit_price)
    }
}

/// A persisted, immutable transaction record.
///
/// Once a document is persisted it is never edited; deleting it reverses its
/// stock effect and removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub doc_type: DocumentType,
    pub doc_date: NaiveDate,
    pub note: String,
    pub lines: Vec<DocumentLine>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn total_amount(&self) -> i64 {
        self.lines
            .iter()
            .map(DocumentLine::subtotal)
            .fold(0, i64::saturating_add)
    }
}
