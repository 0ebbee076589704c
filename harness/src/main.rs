//! Standalone runner: executes every simulation once and prints the report.
//!
//! Configuration comes from the environment (a `.env` file is honoured):
//!
//!   LATENCY_DB_PATH            result log / embedded store (default `db/latency_simulations.sqlite`)
//!   SAME_BOX_POSTGRES_URL      \
//!   INTRA_AZ_POSTGRES_URL       | remote targets; `sqlite://<path>` runs a slot
//!   INTER_AZ_POSTGRES_URL       | against an embedded file instead
//!   INTER_REGION_POSTGRES_URL  /
//!   LATENCY_WORKLOAD_SEED      fixed generator seed (optional)
//!   LATENCY_LOG_LEVEL / LATENCY_LOG_FILE
//!
//! Usage:
//!   cargo run --release --bin latency-sim [sort_column] [asc|desc]

use anyhow::Context;
use latency_harness::config::HarnessConfig;
use latency_harness::orchestrator::Simulator;
use latency_harness::report::print_report;
use latency_harness::results::{SortColumn, SortDirection};
use log::info;
use std::env;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = latency_core::resolve_log_level("LATENCY_LOG_LEVEL");
    let log_file = latency_core::resolve_log_file("LATENCY_LOG_FILE", None);
    latency_core::initialize_logger(log_level, log_file.as_deref())
        .context("initialise logger")?;

    let args: Vec<String> = env::args().skip(1).collect();
    let column = SortColumn::parse(args.first().map(String::as_str).unwrap_or("label"));
    let direction = SortDirection::parse(args.get(1).map(String::as_str).unwrap_or("asc"));

    let config = HarnessConfig::from_env();
    info!(
        "Running latency simulations (db={}, remotes configured={})",
        config.database_path.display(),
        config.remote_urls.len()
    );

    let simulator = Simulator::from_config(&config)?;
    simulator.run_all()?;

    let rows = simulator.list_sorted(column, direction)?;
    print_report(&rows);
    Ok(())
}
