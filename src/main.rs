// src/main.rs
// =============================================================================
// This is the entry point of the page-walker CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Load the graph and run the requested walker(s)
// 4. Print a table or JSON and exit with a proper code
//    (0 = walkers agree, 1 = walkers disagree or re-fetched a page, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, StrategyArg};
use page_walker::crawl::FetchLimit;
use page_walker::fetch::{FakeFetcher, Fixture, NodeId};
use page_walker::report::{run_strategy, CrawlSummary, StrategyReport};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Events go to stderr so `--json` output on stdout stays parseable.
// RUST_LOG wins over --verbose when it's set.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Crawl {
            seed,
            strategy,
            graph,
            max_in_flight,
            delay_ms,
            json,
        } => {
            let options = CrawlOptions {
                seed,
                strategy,
                graph,
                max_in_flight,
                delay: Duration::from_millis(delay_ms),
                json,
            };
            handle_crawl(options).await
        }
        Commands::Fixture => {
            let json = serde_json::to_string_pretty(&Fixture::builtin())?;
            println!("{}", json);
            Ok(0)
        }
    }
}

struct CrawlOptions {
    seed: Option<String>,
    strategy: StrategyArg,
    graph: Option<PathBuf>,
    max_in_flight: Option<usize>,
    delay: Duration,
    json: bool,
}

async fn handle_crawl(options: CrawlOptions) -> Result<i32> {
    let fixture = match &options.graph {
        Some(path) => Fixture::load(path)?,
        None => Fixture::builtin(),
    };

    let seed = options
        .seed
        .map(NodeId::from)
        .unwrap_or_else(|| fixture.seed.clone());

    let fetcher = FakeFetcher::new(fixture).with_max_delay(options.delay);
    let limit = FetchLimit::new(options.max_in_flight);

    let strategies = options.strategy.strategies();

    let mut reports = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        let report = run_strategy(strategy, &seed, fetcher.clone(), &limit)
            .await
            .with_context(|| format!("{} walk failed", strategy))?;
        reports.push(report);
    }

    // Only report a cap that is actually in force (0 means none)
    let max_in_flight = options.max_in_flight.filter(|_| limit.is_bounded());
    let summary = CrawlSummary::new(seed, max_in_flight, reports);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_table(&summary);
    }

    Ok(if summary.consistent { 0 } else { 1 })
}

// Prints one row per strategy, then the pages they visited
fn print_table(summary: &CrawlSummary) {
    println!("🌱 Seed: {}", summary.seed);
    if let Some(max) = summary.max_in_flight {
        println!("🚦 Max in flight: {}", max);
    }
    println!();

    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>8} {:>10}",
        "STRATEGY", "VISITED", "FETCHES", "FOUND", "MISSING", "TIME (ms)"
    );
    println!("{}", "=".repeat(57));
    for report in &summary.reports {
        println!(
            "{:<10} {:>8} {:>8} {:>8} {:>8} {:>10}",
            report.strategy.to_string(),
            report.visited.len(),
            report.fetches,
            report.found,
            report.missing,
            report.elapsed_ms
        );
    }
    println!();

    for report in summary.reports.iter().filter(|r| !r.fetched_each_once()) {
        print_repeats(report);
    }

    if let Some(first) = summary.reports.first() {
        println!("📄 Visited pages:");
        for id in &first.visited {
            println!("   {}", id);
        }
        println!();
    }

    if summary.consistent {
        println!("✅ All walkers visited the same pages, each exactly once");
    } else {
        println!("❌ Walkers disagree");
    }
}

fn print_repeats(report: &StrategyReport) {
    println!("🔁 {} fetched some pages more than once:", report.strategy);
    for id in &report.repeated {
        println!("   {}", id);
    }
    println!();
}
