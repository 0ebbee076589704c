//! Network-distance latency harness
//!
//! Times a fixed battery of database operations against an embedded SQLite
//! file and four Postgres targets placed at increasing network distance
//! (same box, same availability zone, cross-AZ, cross-region), reduces each
//! phase to percentile statistics and records them in a SQLite result log.
//!
//! Entry point: [`orchestrator::Simulator::run_all`].
//! Run once from the command line: `cargo run --release --bin latency-sim`
//! Run tests: `cargo test`

pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod orchestrator;
pub mod report;
pub mod results;
pub mod stats;
pub mod workload;

pub use error::{HarnessError, Result};
