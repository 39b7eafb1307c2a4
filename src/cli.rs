// src/cli.rs
// =============================================================================
// Command-line interface, parsed with clap's derive API.
//
// page-walker crawl [SEED] [--strategy serial|shared|channel|all] [--graph FILE]
//                   [--max-in-flight N] [--delay-ms MS] [--json]
// page-walker fixture
//
// `--strategy all` (the default) runs all three walkers and compares them.
// =============================================================================

use clap::{Parser, Subcommand, ValueEnum};
use page_walker::crawl::Strategy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "page-walker",
    version = "0.1.0",
    about = "Walks a page graph with three different concurrency strategies",
    long_about = "page-walker visits every page reachable from a seed, once, using a serial \
                  walker, a shared-state walker with a mutex, and a channel-based coordinator. \
                  Running all three on the same graph shows they visit the same pages."
)]
pub struct Cli {
    /// Log debug events too (RUST_LOG overrides this)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a graph from a seed page
    ///
    /// Example: page-walker crawl http://golang.org/ --delay-ms 20
    Crawl {
        /// Page to start from (defaults to the graph's own seed)
        seed: Option<String>,

        /// Which walker to run; `all` runs every one and compares them
        #[arg(long, value_enum, default_value_t = StrategyArg::All)]
        strategy: StrategyArg,

        /// JSON graph file to walk instead of the built-in Go tour graph
        ///
        /// Shape: { "seed": "A", "pages": { "A": { "links": ["B"] } } }
        #[arg(long)]
        graph: Option<PathBuf>,

        /// Cap on concurrent fetches (0 or unset = no cap)
        #[arg(long)]
        max_in_flight: Option<usize>,

        /// Each fetch sleeps a random 0..=MS milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the built-in graph as JSON, a starting point for --graph files
    Fixture,
}

// --strategy values: one walker, or all of them
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Depth-first recursion on a single thread
    Serial,
    /// Concurrent recursion with a mutex-guarded visited set
    Shared,
    /// Workers report to a coordinator over a channel
    Channel,
    /// Every walker, one after another
    All,
}

impl StrategyArg {
    pub fn strategies(self) -> Vec<Strategy> {
        match self {
            StrategyArg::Serial => vec![Strategy::Serial],
            StrategyArg::Shared => vec![Strategy::Shared],
            StrategyArg::Channel => vec![Strategy::Channel],
            StrategyArg::All => Strategy::ALL.to_vec(),
        }
    }
}
