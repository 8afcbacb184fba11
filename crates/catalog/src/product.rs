use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ProductId};

/// A catalog concept, e.g. "Nike Air Zoom".
///
/// Products are purely descriptive: they carry no stock of their own. Stock
/// lives on the product's variants, one quantity per SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    /// Price in smallest currency unit (e.g., cents).
    pub base_price: u64,
    pub category: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        brand: impl Into<String>,
        base_price: u64,
    ) -> DomainResult<Self> {
        let name = name.into();
        let brand = brand.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if brand.trim().is_empty() {
            return Err(DomainError::validation("product brand cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            brand,
            base_price,
            category: None,
            description: String::new(),
            created_at: Utc::now(),
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Case-insensitive substring match over the descriptive fields.
    ///
    /// An empty keyword matches everything.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&keyword)
            || self.brand.to_lowercase().contains(&keyword)
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&keyword))
            || self.description.to_lowercase().contains(&keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_rejects_empty_name() {
        let err = Product::new(ProductId::new(), "   ", "Acme", 1000).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn new_product_rejects_empty_brand() {
        let err = Product::new(ProductId::new(), "Air Zoom", "", 1000).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn keyword_search_is_case_insensitive() {
        let product = Product::new(ProductId::new(), "Air Zoom", "Nike", 12900)
            .unwrap()
            .with_category("Running")
            .with_description("Lightweight road shoe");

        assert!(product.matches_keyword("air"));
        assert!(product.matches_keyword("NIKE"));
        assert!(product.matches_keyword("running"));
        assert!(product.matches_keyword("road"));
        assert!(!product.matches_keyword("sandal"));
    }

    #[test]
    fn empty_keyword_matches_everything() {
        let product = Product::new(ProductId::new(), "Air Zoom", "Nike", 12900).unwrap();
        assert!(product.matches_keyword(""));
        assert!(product.matches_keyword("   "));
    }
}
