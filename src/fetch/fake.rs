// src/fetch/fake.rs
// =============================================================================
// An in-memory fetcher that serves canned pages.
//
// How it works:
// 1. A Fixture is a seed id plus a map of id -> page (body + links)
// 2. FakeFetcher looks the id up in that map
// 3. Known id -> return its links, unknown id -> FetchError::NotFound
//
// Fixtures can come from three places:
// - the built-in Go-tour graph (Fixture::builtin)
// - a JSON file passed with --graph (Fixture::load)
// - an edge list, which is what the tests use (FakeFetcher::from_edges)
//
// The fetcher can also sleep for a random time on every call. That doesn't
// change any answer, it only shuffles the order in which concurrent fetches
// finish, which is exactly what we want when comparing walkers.
// =============================================================================

use super::{FetchError, Fetcher, NodeId};
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

// One canned page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FakePage {
    /// Page text. Never read by the walkers, kept so fixtures look like pages.
    #[serde(default)]
    pub body: String,
    /// Outgoing links, in page order
    #[serde(default)]
    pub links: Vec<NodeId>,
}

// A whole graph plus the id to start walking from
//
// BTreeMap keeps the JSON output sorted, which makes `page-walker fixture`
// stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub seed: NodeId,
    pub pages: BTreeMap<NodeId, FakePage>,
}

impl Fixture {
    // The graph from the Go tour crawler exercise.
    // Note that "http://golang.org/cmd/" is linked but has no page, so every
    // walk produces exactly one "missing" line.
    pub fn builtin() -> Self {
        let page = |body: &str, links: &[&str]| FakePage {
            body: body.to_string(),
            links: links.iter().map(|l| NodeId::from(*l)).collect(),
        };

        let mut pages = BTreeMap::new();
        pages.insert(
            NodeId::from("http://golang.org/"),
            page(
                "The Go Programming Language",
                &["http://golang.org/pkg/", "http://golang.org/cmd/"],
            ),
        );
        pages.insert(
            NodeId::from("http://golang.org/pkg/"),
            page(
                "Packages",
                &[
                    "http://golang.org/",
                    "http://golang.org/cmd/",
                    "http://golang.org/pkg/fmt/",
                    "http://golang.org/pkg/os/",
                ],
            ),
        );
        pages.insert(
            NodeId::from("http://golang.org/pkg/fmt/"),
            page(
                "Package fmt",
                &["http://golang.org/", "http://golang.org/pkg/"],
            ),
        );
        pages.insert(
            NodeId::from("http://golang.org/pkg/os/"),
            page(
                "Package os",
                &["http://golang.org/", "http://golang.org/pkg/"],
            ),
        );

        Fixture {
            seed: NodeId::from("http://golang.org/"),
            pages,
        }
    }

    // Loads a fixture from a JSON file
    //
    // Expected shape:
    //   { "seed": "A", "pages": { "A": { "body": "...", "links": ["B"] } } }
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read graph file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Invalid graph file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let fixture: Fixture = serde_json::from_str(raw)?;
        Ok(fixture)
    }
}

// A Fetcher that answers from a fixture graph
#[derive(Debug, Clone, Default)]
pub struct FakeFetcher {
    pages: HashMap<NodeId, FakePage>,
    max_delay: Option<Duration>,
}

impl FakeFetcher {
    pub fn new(fixture: Fixture) -> Self {
        FakeFetcher {
            pages: fixture.pages.into_iter().collect(),
            max_delay: None,
        }
    }

    // Builds a fetcher straight from (page, links) pairs
    pub fn from_edges(edges: &[(&str, &[&str])]) -> Self {
        let pages = edges
            .iter()
            .map(|(id, links)| {
                let page = FakePage {
                    body: String::new(),
                    links: links.iter().map(|l| NodeId::from(*l)).collect(),
                };
                (NodeId::from(*id), page)
            })
            .collect();

        FakeFetcher {
            pages,
            max_delay: None,
        }
    }

    // A straight line n0 -> n1 -> ... -> n{len}, for depth tests
    #[cfg(test)]
    pub(crate) fn chain(len: usize) -> Self {
        let pages = (0..=len)
            .map(|i| {
                let links = if i < len {
                    vec![NodeId::new(format!("n{}", i + 1))]
                } else {
                    Vec::new()
                };
                let page = FakePage {
                    body: String::new(),
                    links,
                };
                (NodeId::new(format!("n{i}")), page)
            })
            .collect();

        FakeFetcher {
            pages,
            max_delay: None,
        }
    }

    // Every fetch will sleep somewhere between 0 and `max_delay`
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = (!max_delay.is_zero()).then_some(max_delay);
        self
    }

    fn simulate_latency(&self) {
        if let Some(max) = self.max_delay {
            let millis = rand::rng().random_range(0..=whole_millis(max));
            std::thread::sleep(Duration::from_millis(millis));
        }
    }
}

// Duration::as_millis is a u128; anything past u64 is forever anyway
fn whole_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
        self.simulate_latency();

        match self.pages.get(id) {
            Some(page) => Ok(page.links.clone()),
            None => Err(FetchError::NotFound(id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_page_returns_links_in_order() {
        let fetcher = FakeFetcher::from_edges(&[("A", &["B", "C"])]);
        let links = fetcher.fetch(&NodeId::from("A")).unwrap();
        assert_eq!(links, vec![NodeId::from("B"), NodeId::from("C")]);
    }

    #[test]
    fn test_unknown_page_is_not_found() {
        let fetcher = FakeFetcher::from_edges(&[("A", &["B"])]);
        let err = fetcher.fetch(&NodeId::from("D")).unwrap_err();
        assert_eq!(err, FetchError::NotFound(NodeId::from("D")));
    }

    #[test]
    fn test_fetch_is_deterministic() {
        let fetcher = FakeFetcher::new(Fixture::builtin());
        let id = NodeId::from("http://golang.org/pkg/");
        assert_eq!(fetcher.fetch(&id), fetcher.fetch(&id));
    }

    #[test]
    fn test_builtin_fixture_links_to_missing_cmd_page() {
        let fixture = Fixture::builtin();
        assert!(fixture.pages.contains_key(&fixture.seed));
        assert!(!fixture
            .pages
            .contains_key(&NodeId::from("http://golang.org/cmd/")));
    }

    #[test]
    fn test_fixture_from_json() {
        let raw = r#"{
            "seed": "A",
            "pages": {
                "A": { "links": ["B", "C"] },
                "B": { "body": "bee", "links": ["A"] },
                "C": {}
            }
        }"#;
        let fixture = Fixture::from_json(raw).unwrap();
        assert_eq!(fixture.seed, NodeId::from("A"));
        assert_eq!(fixture.pages.len(), 3);
        assert!(fixture.pages[&NodeId::from("C")].links.is_empty());
        assert_eq!(fixture.pages[&NodeId::from("B")].body, "bee");
    }

    #[test]
    fn test_fixture_json_without_seed_is_rejected() {
        assert!(Fixture::from_json(r#"{ "pages": {} }"#).is_err());
    }

    #[test]
    fn test_chain_ends_in_a_page_without_links() {
        let fetcher = FakeFetcher::chain(3);
        assert_eq!(fetcher.fetch(&NodeId::from("n0")).unwrap(), vec![NodeId::from("n1")]);
        assert!(fetcher.fetch(&NodeId::from("n3")).unwrap().is_empty());
        assert!(fetcher.fetch(&NodeId::from("n4")).is_err());
    }

    #[test]
    fn test_huge_delay_saturates_instead_of_wrapping() {
        assert_eq!(whole_millis(Duration::from_millis(25)), 25);
        assert_eq!(whole_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_zero_delay_is_no_delay() {
        let fetcher = FakeFetcher::from_edges(&[]).with_max_delay(Duration::ZERO);
        assert!(fetcher.max_delay.is_none());
    }
}
