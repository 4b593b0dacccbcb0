// src/pipeline/dedup.rs

//! Process-lifetime deduplication of published product IDs.

use std::collections::HashSet;

/// Set of product IDs that have already been published.
///
/// Owned by the discovery cycle and touched only on its execution context,
/// so no locking is needed. IDs are never evicted and the set is not
/// persisted: a restart starts empty.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    /// Create an empty deduplicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an ID has already been published.
    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record an ID as published.
    pub fn mark_seen(&mut self, id: &str) {
        self.seen.insert(id.to_string());
    }

    /// Number of IDs published so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unseen() {
        let dedup = Deduplicator::new();
        assert!(!dedup.has_seen("B0TEST0001"));
        assert!(dedup.is_empty());
    }

    #[test]
    fn marked_ids_stay_seen() {
        let mut dedup = Deduplicator::new();
        dedup.mark_seen("B0TEST0001");
        assert!(dedup.has_seen("B0TEST0001"));
        assert!(!dedup.has_seen("B0TEST0002"));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn marking_is_idempotent() {
        let mut dedup = Deduplicator::new();
        dedup.mark_seen("B0TEST0001");
        dedup.mark_seen("B0TEST0001");
        assert_eq!(dedup.len(), 1);
    }
}
