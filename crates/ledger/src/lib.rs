//! Stock-ledger domain module.
//!
//! The ledger records the transactions that change stock — inbound receipts,
//! outbound shipments, and manual adjustments — and owns every code path that
//! mutates a variant's quantity. Persistence is reached only through the two
//! store ports in [`ports`]; their backing technology is irrelevant here.

pub mod document;
pub mod engine;
pub mod ports;
pub mod view;

pub use document::{Document, DocumentLine, DocumentType, DraftDocument, DraftLine};
pub use engine::{MAX_CAS_RETRIES, StockLedger, rollback_impacts};
pub use ports::{DocumentStore, StoreError, VariantStore};
pub use view::{DocumentLineView, DocumentView};
