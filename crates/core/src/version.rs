//! Optimistic-concurrency version expectations for store writes.

use serde::{Deserialize, Serialize};

/// What a writer expects the stored record version to be.
///
/// Stock mutations are read-modify-write sequences against stores that offer
/// no cross-call isolation. Pinning the write to the version that was read
/// lets a store reject interleaved writers with a conflict instead of
/// silently losing an update.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedVersion {
    /// No expectation; last write wins.
    Any,
    /// The stored version must be exactly this value.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(&self, current: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(expected) => *expected == current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_every_version() {
        assert!(ExpectedVersion::Any.matches(0));
        assert!(ExpectedVersion::Any.matches(42));
    }

    #[test]
    fn exact_matches_only_its_own_version() {
        assert!(ExpectedVersion::Exact(3).matches(3));
        assert!(!ExpectedVersion::Exact(3).matches(4));
        assert!(!ExpectedVersion::Exact(3).matches(0));
    }
}
