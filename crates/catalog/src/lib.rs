//! Catalog domain module.
//!
//! This crate contains the Product and Variant value types, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod variant;

pub use product::Product;
pub use variant::{DEFAULT_SAFETY_STOCK, Variant};
