// src/crawl/visited.rs
// =============================================================================
// Keeping track of which pages have already been claimed.
//
// - VisitedSet: a plain set, for code that owns it outright (the serial
//   walker and the channel coordinator)
// - VisitedTracker: the same set behind a Mutex, for the shared-state walker
//   where many tasks race to claim pages
//
// Both expose one operation, test_and_mark: "was this already visited? and
// whatever the answer, it is visited now". The first caller for an id gets
// `false` (you own this page), everyone after gets `true`.
// =============================================================================

use crate::fetch::NodeId;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    visited: HashSet<NodeId>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns true if `id` was already marked. Marks it either way.
    pub fn test_and_mark(&mut self, id: &NodeId) -> bool {
        if self.visited.contains(id) {
            return true;
        }
        self.visited.insert(id.clone());
        false
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.visited.contains(id)
    }

    // Sorted copy, handy for comparing runs
    pub fn to_sorted(&self) -> BTreeSet<NodeId> {
        self.visited.iter().cloned().collect()
    }
}

// A VisitedSet that many tasks can share
//
// The lock is held only for the O(1) check-and-insert, never across a fetch.
#[derive(Debug, Default)]
pub struct VisitedTracker {
    inner: Mutex<VisitedSet>,
}

impl VisitedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test_and_mark(&self, id: &NodeId) -> bool {
        self.lock().test_and_mark(id)
    }

    pub fn to_sorted(&self) -> BTreeSet<NodeId> {
        self.lock().to_sorted()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VisitedSet> {
        // A panic while holding this lock can't leave the set half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
