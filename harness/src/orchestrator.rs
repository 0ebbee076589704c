//! Simulation orchestrator: every backend, every phase, one commit.

use crate::catalog::{Backend, BackendCatalog, ConnectionTarget};
use crate::config::HarnessConfig;
use crate::driver::sqlite::SqliteConnection;
use crate::driver::WorkloadConnection;
use crate::error::{HarnessError, Result};
use crate::results::{ResultRow, ResultStore, SortColumn, SortDirection};
use crate::stats::{reduce_durations, LatencyStats};
use crate::workload::{Phase, PhaseSamples, WorkloadRunner};
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Reduced statistics of one backend run.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub read1: LatencyStats,
    pub read2: LatencyStats,
    pub write1: LatencyStats,
}

impl Simulation {
    pub fn from_samples(samples: &PhaseSamples) -> Result<Self> {
        Ok(Self {
            read1: reduce_durations(samples.get(Phase::Read1))?,
            read2: reduce_durations(samples.get(Phase::Read2))?,
            write1: reduce_durations(samples.get(Phase::Write1))?,
        })
    }

    pub fn get(&self, phase: Phase) -> &LatencyStats {
        match phase {
            Phase::Read1 => &self.read1,
            Phase::Read2 => &self.read2,
            Phase::Write1 => &self.write1,
        }
    }

    /// One row per phase, labelled `"<Backend> <Phase>"`.
    pub fn rows(&self, backend: Backend) -> Vec<ResultRow> {
        Phase::ALL
            .iter()
            .map(|&phase| ResultRow::new(label(backend, phase), *self.get(phase)))
            .collect()
    }
}

pub fn label(backend: Backend, phase: Phase) -> String {
    format!("{} {}", backend.name(), phase.name())
}

/// Owns the run lock, the catalog, the result store and the embedded handle.
///
/// Runs are serialized: a second `run_all` blocks until the first commits.
/// The embedded backend reuses one long-lived connection across runs; it is
/// opened on first use unless supplied up front.
pub struct Simulator {
    catalog: BackendCatalog,
    store: Arc<ResultStore>,
    embedded: Mutex<Option<SqliteConnection>>,
    workload_seed: Option<u64>,
    run_lock: Mutex<()>,
}

impl Simulator {
    pub fn new(catalog: BackendCatalog, store: Arc<ResultStore>) -> Self {
        Self {
            catalog,
            store,
            embedded: Mutex::new(None),
            workload_seed: None,
            run_lock: Mutex::new(()),
        }
    }

    /// Open the result log at the configured path and build the catalog.
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        let store = Arc::new(ResultStore::open(&config.database_path)?);
        let mut simulator = Self::new(BackendCatalog::from_config(config), store);
        simulator.workload_seed = config.workload_seed;
        Ok(simulator)
    }

    pub fn with_workload_seed(mut self, seed: u64) -> Self {
        self.workload_seed = Some(seed);
        self
    }

    /// Run the embedded backend on `conn` instead of opening the configured file.
    pub fn with_embedded_connection(self, conn: SqliteConnection) -> Self {
        *self.embedded.lock().unwrap_or_else(PoisonError::into_inner) = Some(conn);
        self
    }

    /// Take the run lock without running. Triggers block until the guard drops.
    pub fn pause_runs(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no bad state.
        self.run_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the workload against every backend and persist all fifteen rows
    /// atomically. The first failure aborts the run; nothing is written.
    pub fn run_all(&self) -> Result<()> {
        let _guard = self.pause_runs();

        let started = Instant::now();
        let mut rows = Vec::with_capacity(self.catalog.backends().len() * Phase::ALL.len());
        for &backend in self.catalog.backends() {
            let simulation = self
                .simulate(backend)
                .map_err(|err| HarnessError::run(backend.name(), err))?;
            rows.extend(simulation.rows(backend));
        }

        self.store
            .upsert_all(&rows)
            .map_err(|err| HarnessError::run("result log", err))?;

        info!(
            "Recorded {} latency rows in {:.2}s",
            rows.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Run the workload against one backend and reduce its phases.
    pub fn simulate(&self, backend: Backend) -> Result<Simulation> {
        match self.catalog.resolve(backend)? {
            ConnectionTarget::Embedded(path) if backend == Backend::Sqlite => {
                let mut slot = self.embedded.lock().unwrap_or_else(PoisonError::into_inner);
                let conn = match slot.take() {
                    Some(conn) => conn,
                    None => SqliteConnection::open(&path)?,
                };
                let conn = slot.insert(conn);
                self.measure(backend, conn)
            }
            target => {
                let mut conn = target.connect()?;
                self.measure(backend, &mut *conn)
            }
        }
    }

    fn measure(&self, backend: Backend, conn: &mut dyn WorkloadConnection) -> Result<Simulation> {
        let mut runner = match self.workload_seed {
            Some(seed) => WorkloadRunner::seeded(seed),
            None => WorkloadRunner::from_entropy(),
        };

        let started = Instant::now();
        let samples = runner.run(&mut *conn).map_err(|failure| {
            let completed: Vec<&str> = failure.completed.iter().map(|(p, _)| p.name()).collect();
            warn!(
                "{backend} ({}) aborted after phases {completed:?}: {}",
                conn.engine(),
                failure.error
            );
            failure.error
        })?;
        let simulation = Simulation::from_samples(&samples)?;

        info!(
            "{backend} ({}) done in {:.2}s: read1 p50={:.0}ns read2 p50={:.0}ns write1 p50={:.0}ns",
            conn.engine(),
            started.elapsed().as_secs_f64(),
            simulation.read1.median,
            simulation.read2.median,
            simulation.write1.median
        );
        Ok(simulation)
    }

    pub fn list_sorted(
        &self,
        column: SortColumn,
        direction: SortDirection,
    ) -> Result<Vec<ResultRow>> {
        self.store.list_sorted(column, direction)
    }
}
