//! Store implementations for the stock ledger.
//!
//! Currently one backend: an in-memory store for tests, development, and
//! seeding. Anything that speaks the two port traits in `stockroom-ledger`
//! can replace it.

pub mod in_memory;


pub use in_memory::InMemoryInventory;
