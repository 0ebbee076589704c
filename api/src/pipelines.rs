use std::sync::Arc;

use latency_harness::orchestrator::Simulator;
use latency_harness::results::{ResultRow, SortColumn, SortDirection};
use log::error;

/// Runs every simulation on the blocking pool.
/// The harness holds a blocking run lock and synchronous database handles, so it must stay off
/// the async workers; a second trigger waits here until the first run has committed.
///
/// # Returns
/// * `Ok(())` once all fifteen rows are committed.
/// * `Err(String)` with the raw error detail otherwise.
pub(crate) async fn run_simulations(simulator: Arc<Simulator>) -> Result<(), String> {
    match tokio::task::spawn_blocking(move || simulator.run_all()).await {
        Ok(result) => result.map_err(|err| err.to_string()),
        Err(err) => {
            error!("Simulation task panicked: {}", err);
            Err(format!("simulation task failed: {err}"))
        }
    }
}

/// Reads the whole result log, ordered as requested.
pub(crate) async fn list_rows(
    simulator: Arc<Simulator>,
    column: SortColumn,
    direction: SortDirection,
) -> Result<Vec<ResultRow>, String> {
    match tokio::task::spawn_blocking(move || simulator.list_sorted(column, direction)).await {
        Ok(result) => result.map_err(|err| err.to_string()),
        Err(err) => Err(format!("listing task failed: {err}")),
    }
}
