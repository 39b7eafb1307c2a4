// src/fetch/recorder.rs
// =============================================================================
// A fetcher wrapper that writes down every fetch attempt.
//
// The walkers deliberately swallow NotFound errors: a missing page is just a
// page with no links. RecordingFetcher is the side channel that lets us see
// what happened anyway, without changing how the walk behaves:
// - which ids were fetched (that is the visited set, for every strategy)
// - how often each id was fetched (should always be exactly once)
// - which fetches found a page and which ones were missing
// =============================================================================

use super::{FetchError, Fetcher, NodeId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

// One fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchEvent {
    pub id: NodeId,
    pub found: bool,
}

#[derive(Debug)]
pub struct RecordingFetcher<F> {
    inner: F,
    events: Mutex<Vec<FetchEvent>>,
}

impl<F: Fetcher> RecordingFetcher<F> {
    pub fn new(inner: F) -> Self {
        RecordingFetcher {
            inner,
            events: Mutex::new(Vec::new()),
        }
    }

    // Every attempt so far, in the order the fetches completed
    pub fn events(&self) -> Vec<FetchEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // The set of ids that were fetched at least once
    pub fn fetched(&self) -> BTreeSet<NodeId> {
        self.events().into_iter().map(|e| e.id).collect()
    }

    // How many times each id was fetched
    pub fn call_counts(&self) -> BTreeMap<NodeId, usize> {
        let mut counts = BTreeMap::new();
        for event in self.events() {
            *counts.entry(event.id).or_insert(0) += 1;
        }
        counts
    }

    pub fn missing_count(&self) -> usize {
        self.events().iter().filter(|e| !e.found).count()
    }
}

impl<F: Fetcher> Fetcher for RecordingFetcher<F> {
    fn fetch(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
        let result = self.inner.fetch(id);

        // Lock only to push; the (possibly slow) inner fetch runs unlocked
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FetchEvent {
                id: id.clone(),
                found: result.is_ok(),
            });

        result
    }
}
