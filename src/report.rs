// src/report.rs
// =============================================================================
// Running a walker and summarising what it did.
//
// The walkers return nothing, on purpose. To see what happened we wrap the
// fetcher in a RecordingFetcher, run one walk per strategy on a fresh
// recorder, and read the recorded fetch attempts back afterwards.
//
// A summary is "consistent" when every strategy fetched the same set of pages
// and none of them fetched any page twice.
// =============================================================================

use crate::crawl::{
    crawl_channel, crawl_serial, crawl_shared, FetchLimit, Strategy, VisitedSet, VisitedTracker,
};
use crate::fetch::{Fetcher, NodeId, RecordingFetcher};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

// What one strategy did during one walk
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub strategy: Strategy,
    /// Every page that was fetched, sorted
    pub visited: BTreeSet<NodeId>,
    /// Total fetch calls, including repeats
    pub fetches: usize,
    pub found: usize,
    pub missing: usize,
    /// Pages fetched more than once (should always be empty)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repeated: Vec<NodeId>,
    pub elapsed_ms: u64,
}

impl StrategyReport {
    fn from_recorder<F: Fetcher>(
        strategy: Strategy,
        recorder: &RecordingFetcher<F>,
        started: Instant,
    ) -> Self {
        let events = recorder.events();
        let missing = events.iter().filter(|e| !e.found).count();
        let repeated = recorder
            .call_counts()
            .into_iter()
            .filter(|(_, calls)| *calls > 1)
            .map(|(id, _)| id)
            .collect();

        StrategyReport {
            strategy,
            visited: recorder.fetched(),
            fetches: events.len(),
            found: events.len() - missing,
            missing,
            repeated,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn fetched_each_once(&self) -> bool {
        self.repeated.is_empty()
    }
}

// All the strategies that ran from one seed
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub seed: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,
    pub reports: Vec<StrategyReport>,
    pub consistent: bool,
}

impl CrawlSummary {
    pub fn new(seed: NodeId, max_in_flight: Option<usize>, reports: Vec<StrategyReport>) -> Self {
        let consistent = match reports.first() {
            Some(first) => reports
                .iter()
                .all(|r| r.visited == first.visited && r.fetched_each_once()),
            None => true,
        };

        CrawlSummary {
            seed,
            max_in_flight,
            reports,
            consistent,
        }
    }
}

// Runs one strategy from `seed` over its own fresh recorder and visited state
pub async fn run_strategy<F: Fetcher>(
    strategy: Strategy,
    seed: &NodeId,
    fetcher: F,
    limit: &FetchLimit,
) -> Result<StrategyReport> {
    info!(%strategy, %seed, "starting walk");

    let recorder = Arc::new(RecordingFetcher::new(fetcher));
    let started = Instant::now();

    match strategy {
        Strategy::Serial => {
            // crawl_serial blocks for the whole walk, keep it off the runtime
            let recorder = Arc::clone(&recorder);
            let seed = seed.clone();
            tokio::task::spawn_blocking(move || {
                let mut visited = VisitedSet::new();
                crawl_serial(&seed, &*recorder, &mut visited);
            })
            .await
            .context("serial walk panicked")?;
        }
        Strategy::Shared => {
            let visited = Arc::new(VisitedTracker::new());
            crawl_shared(seed.clone(), Arc::clone(&recorder), visited, limit.clone()).await;
        }
        Strategy::Channel => {
            crawl_channel(seed.clone(), Arc::clone(&recorder), limit.clone()).await;
        }
    }

    let report = StrategyReport::from_recorder(strategy, &recorder, started);
    info!(
        %strategy,
        visited = report.visited.len(),
        missing = report.missing,
        elapsed_ms = report.elapsed_ms,
        "walk finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FakeFetcher, Fixture};

    fn report(strategy: Strategy, visited: &[&str], repeated: &[&str]) -> StrategyReport {
        StrategyReport {
            strategy,
            visited: visited.iter().map(|id| NodeId::from(*id)).collect(),
            fetches: visited.len() + repeated.len(),
            found: visited.len(),
            missing: 0,
            repeated: repeated.iter().map(|id| NodeId::from(*id)).collect(),
            elapsed_ms: 0,
        }
    }

    #[test]
    fn test_summary_consistent_when_sets_match() {
        let summary = CrawlSummary::new(
            NodeId::from("A"),
            None,
            vec![
                report(Strategy::Serial, &["A", "B"], &[]),
                report(Strategy::Channel, &["B", "A"], &[]),
            ],
        );
        assert!(summary.consistent);
    }

    #[test]
    fn test_summary_flags_different_sets() {
        let summary = CrawlSummary::new(
            NodeId::from("A"),
            None,
            vec![
                report(Strategy::Serial, &["A", "B"], &[]),
                report(Strategy::Shared, &["A"], &[]),
            ],
        );
        assert!(!summary.consistent);
    }

    #[test]
    fn test_summary_flags_repeated_fetches() {
        let summary = CrawlSummary::new(
            NodeId::from("A"),
            None,
            vec![report(Strategy::Shared, &["A", "B"], &["B"])],
        );
        assert!(!summary.consistent);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = CrawlSummary::new(
            NodeId::from("A"),
            Some(2),
            vec![report(Strategy::Serial, &["A"], &[])],
        );
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["seed"], "A");
        assert_eq!(json["max_in_flight"], 2);
        assert_eq!(json["consistent"], true);
        assert_eq!(json["reports"][0]["strategy"], "serial");
        assert!(json["reports"][0].get("repeated").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_serial_run_survives_a_deep_chain() {
        let report = run_strategy(
            Strategy::Serial,
            &NodeId::from("n0"),
            FakeFetcher::chain(20_000),
            &FetchLimit::unbounded(),
        )
        .await
        .unwrap();

        assert_eq!(report.visited.len(), 20_001);
        assert_eq!(report.fetches, 20_001);
        assert!(report.fetched_each_once());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_every_strategy_on_builtin_fixture() {
        let fixture = Fixture::builtin();
        let seed = fixture.seed.clone();
        let fetcher = FakeFetcher::new(fixture);
        let limit = FetchLimit::new(Some(2));

        let mut reports = Vec::new();
        for strategy in Strategy::ALL {
            reports.push(
                run_strategy(strategy, &seed, fetcher.clone(), &limit)
                    .await
                    .unwrap(),
            );
        }

        for r in &reports {
            assert_eq!(r.fetches, 5, "{}", r.strategy);
            assert_eq!(r.found, 4, "{}", r.strategy);
            assert_eq!(r.missing, 1, "{}", r.strategy);
        }
        assert!(CrawlSummary::new(seed, Some(2), reports).consistent);
    }
}
