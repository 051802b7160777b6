//! Dedup ledger of already-captured record ids.

use std::collections::HashSet;

/// Set of record ids captured during one session.
#[derive(Debug, Default, Clone)]
pub struct DedupLedger {
    seen: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Mark an id as seen. Returns `false` if it already was.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.seen.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
