//! End-to-end tour of the stock ledger over the in-memory store.
//!
//! Run with `cargo run --example quickstart` (set `RUST_LOG=debug` to watch
//! every stock write).

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use stockroom_catalog::{Product, Variant};
use stockroom_core::{ProductId, VariantId};
use stockroom_ledger::document::{DocumentType, DraftDocument, DraftLine};
use stockroom_ledger::engine::StockLedger;
use stockroom_store::InMemoryInventory;

fn main() -> Result<()> {
    stockroom_observability::init();

    let store = Arc::new(InMemoryInventory::new());
    let ledger = StockLedger::new(Arc::clone(&store), Arc::clone(&store));

    // Seed a product with two variants. SKUs are derived from the product id
    // and the size/color pair since none are given.
    let tee = Product::new(ProductId::new(), "Logo Tee", "Acme", 1900)?.with_category("Apparel");
    let tee_id = tee.id;
    store.insert_product(tee)?;

    let black_m = Variant::new(VariantId::new(), tee_id, "M", "Black", None)?;
    let black_l = Variant::new(VariantId::new(), tee_id, "L", "Black", None)?;
    let (m_id, l_id) = (black_m.id, black_l.id);
    store.insert_variant(black_m)?;
    store.insert_variant(black_l)?;

    let today = Utc::now().date_naive();

    // Receive stock.
    let mut receipt = DraftDocument::new(DocumentType::Inbound, today).with_note("initial receipt");
    receipt.add_line(DraftLine::new(m_id, 20, 900));
    receipt.add_line(DraftLine::new(l_id, 10, 900));
    let receipt = ledger.create_inbound(receipt)?;
    println!("receipt {} booked", receipt.id);

    // Ship some.
    let mut shipment = DraftDocument::new(DocumentType::Outbound, today);
    shipment.add_line(DraftLine::new(m_id, 6, 1900));
    ledger.create_outbound(shipment)?;

    // A count found two more L than recorded.
    let mut count = DraftDocument::new(DocumentType::Adjust, today).with_note("cycle count");
    count.add_line(DraftLine::new(l_id, 2, 0));
    ledger.create_adjustment(count)?;

    for variant in ledger.variants_for_product(tee_id)? {
        println!(
            "{} [{}]: {} on hand{}",
            variant.display_name(),
            variant.sku,
            variant.stock_qty,
            if variant.is_low_stock() { " (LOW)" } else { "" },
        );
    }

    // Undoing the receipt would leave M at -6 after the shipment, so the
    // ledger refuses and the receipt stays on the books.
    match ledger.delete_document(receipt.id) {
        Err(e) => println!("delete refused as expected: {e}"),
        Ok(()) => println!("unexpected: receipt deleted"),
    }

    for header in ledger.documents(None)? {
        let view = ledger.document_view(header.id)?;
        println!(
            "{} {} — {} line(s), total {}",
            view.doc_date,
            view.doc_type,
            view.lines.len(),
            view.total_amount,
        );
    }

    Ok(())
}
