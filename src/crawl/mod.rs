// src/crawl/mod.rs
// =============================================================================
// The walkers: three ways to visit every page reachable from a seed.
//
// - serial:  plain depth-first recursion on one thread
// - shared:  one task per page, a Mutex-guarded visited set, and every parent
//            waits for the children it spawned
// - channel: one worker task per page sends its links to a single
//            coordinator, which alone decides what to visit next
//
// All three must end up fetching exactly the same set of pages, each exactly
// once. A missing page (FetchError::NotFound) is logged and treated as a page
// without links; it never stops the walk and never reaches the caller.
//
// Rust concepts:
// - Arc: shared ownership of the fetcher across tasks
// - spawn_blocking: running the (blocking) fetch off the async worker threads
// - Boxed futures: an async fn can't call itself without boxing
// =============================================================================

mod channel;
mod limit;
mod serial;
mod shared;
mod visited;

pub use channel::{crawl_channel, OutstandingWork};
pub use limit::FetchLimit;
pub use serial::crawl_serial;
pub use shared::crawl_shared;
pub use visited::{VisitedSet, VisitedTracker};

use crate::fetch::{FetchError, Fetcher, NodeId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which walker to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Depth-first recursion on a single thread
    Serial,
    /// Concurrent recursion with a mutex-guarded visited set
    Shared,
    /// Workers report to a coordinator over a channel
    Channel,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Serial, Strategy::Shared, Strategy::Channel];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Serial => "serial",
            Strategy::Shared => "shared",
            Strategy::Channel => "channel",
        };
        f.write_str(name)
    }
}

// Turns a fetch result into the list of pages to explore next.
//
// This is where the one trace line per fetch comes from, and where NotFound
// gets absorbed.
fn links_or_empty(id: &NodeId, result: Result<Vec<NodeId>, FetchError>) -> Vec<NodeId> {
    match result {
        Ok(links) => {
            info!(links = links.len(), "found:   {}", id);
            links
        }
        Err(FetchError::NotFound(_)) => {
            warn!("missing: {}", id);
            Vec::new()
        }
    }
}

// Runs one fetch on tokio's blocking pool and absorbs any failure.
async fn fetch_blocking<F: Fetcher>(fetcher: &Arc<F>, id: NodeId) -> Vec<NodeId> {
    let task_fetcher = Arc::clone(fetcher);
    let task_id = id.clone();

    match tokio::task::spawn_blocking(move || task_fetcher.fetch(&task_id)).await {
        Ok(result) => links_or_empty(&id, result),
        Err(e) => {
            // The fetcher panicked; as far as the walk goes, the page has no links
            error!(node = %id, error = %e, "fetch task failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FakeFetcher, Fixture, RecordingFetcher};
    use std::collections::BTreeSet;
    use std::time::Duration;

    // Fixture from the design notes: A -> {B, C}, B -> {A, C}, C -> {}
    fn abc() -> FakeFetcher {
        FakeFetcher::from_edges(&[("A", &["B", "C"]), ("B", &["A", "C"]), ("C", &[])])
    }

    fn ids(list: &[&str]) -> BTreeSet<NodeId> {
        list.iter().map(|id| NodeId::from(*id)).collect()
    }

    // Runs one strategy on a fresh recorder and returns what it fetched
    async fn run(strategy: Strategy, fetcher: FakeFetcher, seed: &str) -> Arc<RecordingFetcher<FakeFetcher>> {
        let recorder = Arc::new(RecordingFetcher::new(fetcher));
        let seed = NodeId::from(seed);
        let walk = async {
            match strategy {
                Strategy::Serial => {
                    let mut visited = VisitedSet::new();
                    crawl_serial(&seed, &*recorder, &mut visited);
                }
                Strategy::Shared => {
                    let visited = Arc::new(VisitedTracker::new());
                    crawl_shared(seed.clone(), Arc::clone(&recorder), visited, FetchLimit::unbounded())
                        .await;
                }
                Strategy::Channel => {
                    crawl_channel(seed.clone(), Arc::clone(&recorder), FetchLimit::unbounded()).await;
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(30), walk)
            .await
            .expect("walk did not terminate");
        recorder
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_strategy_visits_abc_exactly_once() {
        for strategy in Strategy::ALL {
            let recorder = run(strategy, abc(), "A").await;

            assert_eq!(recorder.fetched(), ids(&["A", "B", "C"]), "{strategy}");
            assert!(recorder.call_counts().values().all(|n| *n == 1), "{strategy}");
            assert!(!recorder.fetched().contains(&NodeId::from("D")), "{strategy}");
            assert_eq!(recorder.missing_count(), 0, "{strategy}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_strategies_agree_on_builtin_fixture_with_jitter() {
        let fixture = Fixture::builtin();
        let seed = fixture.seed.to_string();
        let fetcher = FakeFetcher::new(fixture).with_max_delay(Duration::from_millis(5));

        let mut visited_sets = Vec::new();
        for strategy in Strategy::ALL {
            let recorder = run(strategy, fetcher.clone(), &seed).await;
            assert!(recorder.call_counts().values().all(|n| *n == 1), "{strategy}");
            // "/cmd/" is linked but missing
            assert_eq!(recorder.missing_count(), 1, "{strategy}");
            visited_sets.push(recorder.fetched());
        }

        assert_eq!(visited_sets[0].len(), 5);
        assert!(visited_sets.iter().all(|set| *set == visited_sets[0]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unknown_seed_is_fetched_once_and_absorbed() {
        for strategy in Strategy::ALL {
            let recorder = run(strategy, abc(), "D").await;
            assert_eq!(recorder.fetched(), ids(&["D"]), "{strategy}");
            assert_eq!(recorder.missing_count(), 1, "{strategy}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_self_loops_and_long_cycles_terminate() {
        let ring = FakeFetcher::from_edges(&[
            ("A", &["A", "B"]),
            ("B", &["C"]),
            ("C", &["D"]),
            ("D", &["A", "E"]),
            ("E", &["E", "X"]),
        ]);

        for strategy in Strategy::ALL {
            let recorder = run(strategy, ring.clone(), "A").await;
            assert_eq!(recorder.fetched(), ids(&["A", "B", "C", "D", "E", "X"]), "{strategy}");
            assert!(recorder.call_counts().values().all(|n| *n == 1), "{strategy}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_strategy_finishes_a_deep_chain() {
        const DEPTH: usize = 20_000;

        for strategy in Strategy::ALL {
            let recorder = run(strategy, FakeFetcher::chain(DEPTH), "n0").await;

            let fetched = recorder.fetched();
            assert_eq!(fetched.len(), DEPTH + 1, "{strategy}");
            assert!(fetched.contains(&NodeId::new(format!("n{DEPTH}"))), "{strategy}");
            assert_eq!(recorder.events().len(), DEPTH + 1, "{strategy}");
            assert_eq!(recorder.missing_count(), 0, "{strategy}");
        }
    }

    #[test]
    fn test_links_or_empty_swallows_not_found() {
        let id = NodeId::from("gone");
        let links = links_or_empty(&id, Err(FetchError::NotFound(id.clone())));
        assert!(links.is_empty());
    }

    #[test]
    fn test_strategy_names() {
        let names: Vec<_> = Strategy::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["serial", "shared", "channel"]);
        assert_eq!(serde_json::to_string(&Strategy::Shared).unwrap(), "\"shared\"");
    }
}
