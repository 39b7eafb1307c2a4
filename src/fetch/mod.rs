// src/fetch/mod.rs
// =============================================================================
// This module defines what it means to "fetch" a page.
//
// The walkers never look inside a fetcher. All they know is:
// - give it a node id
// - get back the ids that page links to, or a NotFound error
//
// Submodules:
// - fake: an in-memory fetcher backed by a fixture graph
// - recorder: a wrapper that remembers every fetch attempt
//
// Rust concepts:
// - Traits: The Fetcher trait is the seam between the walkers and the data
// - Newtypes: NodeId wraps a String so ids can't be mixed up with bodies
// - thiserror: Derives std::error::Error for our error enum
// =============================================================================

mod fake;
mod recorder;

pub use fake::{FakeFetcher, FakePage, Fixture};
pub use recorder::{FetchEvent, RecordingFetcher};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An opaque page identifier. In the fixture graphs this is a URL.
///
/// Only equality, hashing and ordering are ever used; the walkers never
/// parse or normalize it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

/// The only way a fetch can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The fetcher has never heard of this page
    #[error("not found: {0}")]
    NotFound(NodeId),
}

// The capability every walker is built on.
//
// Implementations must be safe to call from many tasks at once (Send + Sync),
// and must be deterministic: asking twice about the same id gives the same
// answer. `fetch` is allowed to block (the fake one can sleep).
pub trait Fetcher: Send + Sync + 'static {
    /// Returns the ids linked from `id`, in page order.
    fn fetch(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError>;
}
