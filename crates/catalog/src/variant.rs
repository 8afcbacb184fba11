use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ProductId, VariantId};

/// Safety-stock threshold applied when a variant does not specify one.
pub const DEFAULT_SAFETY_STOCK: i64 = 5;

/// A stock-keeping unit: one purchasable size/color of a product.
///
/// `stock_qty` is mutated exclusively by the stock ledger engine; the
/// `version` counter is bumped by the variant store on every successful write
/// and is what the engine pins its compare-and-swap updates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub sku: String,
    pub stock_qty: i64,
    pub safety_stock: i64,
    pub version: u64,
}

impl Variant {
    /// Create a variant with zero stock and the default safety threshold.
    ///
    /// When `sku` is absent or blank, one is derived from the product id and
    /// the size/color pair.
    pub fn new(
        id: VariantId,
        product_id: ProductId,
        size: impl Into<String>,
        color: impl Into<String>,
        sku: Option<String>,
    ) -> DomainResult<Self> {
        let size = size.into();
        let color = color.into();

        if size.trim().is_empty() {
            return Err(DomainError::validation("variant size cannot be empty"));
        }
        if color.trim().is_empty() {
            return Err(DomainError::validation("variant color cannot be empty"));
        }

        let sku = match sku {
            Some(s) if !s.trim().is_empty() => s,
            _ => derive_sku(product_id, &size, &color),
        };

        Ok(Self {
            id,
            product_id,
            size,
            color,
            sku,
            stock_qty: 0,
            safety_stock: DEFAULT_SAFETY_STOCK,
            version: 0,
        })
    }

    pub fn with_safety_stock(mut self, safety_stock: i64) -> Self {
        self.safety_stock = safety_stock.max(0);
        self
    }

    /// Full specification name used in messages and list views.
    pub fn display_name(&self) -> String {
        format!("{} / {}", self.size, self.color)
    }

    /// Whether stock has fallen to or below the safety threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock_qty <= self.safety_stock
    }

    /// Apply a signed stock delta, refusing any result below zero.
    pub fn adjust_stock(&mut self, delta: i64) -> DomainResult<()> {
        let new_qty = self.stock_qty + delta;
        if new_qty < 0 {
            return Err(DomainError::rule(format!(
                "stock cannot go negative: {} (on hand: {}, change: {})",
                self.display_name(),
                self.stock_qty,
                delta
            )));
        }
        self.stock_qty = new_qty;
        Ok(())
    }
}

/// Derive a SKU code from the product id and the size/color pair.
///
/// Format: `P{first 8 hex of product id}-{SIZE}-{COLOR}`, uppercased, with
/// whitespace stripped from the components.
fn derive_sku(product_id: ProductId, size: &str, color: &str) -> String {
    let prefix: String = product_id
        .as_uuid()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();
    let safe_size: String = size.split_whitespace().collect();
    let safe_color: String = color.split_whitespace().collect();

    format!("P{prefix}-{safe_size}-{safe_color}").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant() -> Variant {
        Variant::new(
            VariantId::new(),
            ProductId::new(),
            "US 9.5",
            "Red",
            Some("SKU-001".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn new_variant_starts_with_zero_stock_and_default_safety() {
        let v = variant();
        assert_eq!(v.stock_qty, 0);
        assert_eq!(v.safety_stock, DEFAULT_SAFETY_STOCK);
        assert_eq!(v.version, 0);
    }

    #[test]
    fn display_name_is_size_slash_color() {
        assert_eq!(variant().display_name(), "US 9.5 / Red");
    }

    #[test]
    fn blank_sku_is_derived_from_product_and_spec() {
        let product_id = ProductId::new();
        let v = Variant::new(VariantId::new(), product_id, "US 9.5", "Navy Blue", None).unwrap();

        let prefix: String = product_id
            .as_uuid()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect();
        assert_eq!(
            v.sku,
            format!("P{}-US9.5-NAVYBLUE", prefix.to_uppercase())
        );
    }

    #[test]
    fn explicit_sku_is_kept_verbatim() {
        assert_eq!(variant().sku, "SKU-001");
    }

    #[test]
    fn low_stock_includes_the_threshold_itself() {
        let mut v = variant();
        v.stock_qty = DEFAULT_SAFETY_STOCK + 1;
        assert!(!v.is_low_stock());

        v.stock_qty = DEFAULT_SAFETY_STOCK;
        assert!(v.is_low_stock());

        v.stock_qty = 0;
        assert!(v.is_low_stock());
    }

    #[test]
    fn adjust_stock_rejects_negative_result_and_leaves_qty_unchanged() {
        let mut v = variant();
        v.stock_qty = 3;

        let err = v.adjust_stock(-4).unwrap_err();
        match err {
            DomainError::RuleViolation(msg) => assert!(msg.contains("US 9.5 / Red")),
            other => panic!("expected RuleViolation, got {other:?}"),
        }
        assert_eq!(v.stock_qty, 3);
    }

    #[test]
    fn adjust_stock_accepts_exact_drain_to_zero() {
        let mut v = variant();
        v.stock_qty = 2;
        v.adjust_stock(-2).unwrap();
        assert_eq!(v.stock_qty, 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: no sequence of accepted adjustments can drive stock
            /// below zero.
            #[test]
            fn stock_never_goes_negative(deltas in proptest::collection::vec(-50i64..50, 0..64)) {
                let mut v = variant();
                for delta in deltas {
                    let before = v.stock_qty;
                    match v.adjust_stock(delta) {
                        Ok(()) => prop_assert_eq!(v.stock_qty, before + delta),
                        Err(_) => prop_assert_eq!(v.stock_qty, before),
                    }
                    prop_assert!(v.stock_qty >= 0);
                }
            }

            /// Property: low-stock classification is exactly `qty <= safety`.
            #[test]
            fn low_stock_matches_threshold(qty in 0i64..100, safety in 0i64..100) {
                let mut v = variant();
                v.stock_qty = qty;
                v.safety_stock = safety;
                prop_assert_eq!(v.is_low_stock(), qty <= safety);
            }
        }
    }
}
