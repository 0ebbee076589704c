//! Workload runner: provisions fixtures on one connection and times the
//! three query phases.
//!
//! | Phase    | Operation                                   | Samples |
//! |----------|---------------------------------------------|---------|
//! | `Read1`  | highest-priced product (`ORDER BY ... LIMIT 1`) | 100 |
//! | `Read2`  | indexed lookup of a random seeded name      | 100     |
//! | `Write1` | single-row insert into `products`           | 100     |

use crate::driver::{NewProduct, WorkloadConnection};
use crate::error::{HarnessError, Result};
use crate::fixtures::{self, PRODUCT_COUNT};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::{Duration, Instant};

/// Timed iterations per phase.
pub const QUERY_COUNT: usize = 100;

/// One of the three timed operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Rank read: highest-priced product.
    Read1,
    /// Key read: point lookup by indexed name.
    Read2,
    /// Single-row insert.
    Write1,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Read1, Phase::Read2, Phase::Write1];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Read1 => "Read1",
            Phase::Read2 => "Read2",
            Phase::Write1 => "Write1",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw timings of a complete run, one sequence per phase.
#[derive(Debug, Clone, Default)]
pub struct PhaseSamples {
    pub read1: Vec<Duration>,
    pub read2: Vec<Duration>,
    pub write1: Vec<Duration>,
}

impl PhaseSamples {
    pub fn get(&self, phase: Phase) -> &[Duration] {
        match phase {
            Phase::Read1 => &self.read1,
            Phase::Read2 => &self.read2,
            Phase::Write1 => &self.write1,
        }
    }
}

/// An aborted run: the phases that finished, plus the error that stopped it.
///
/// The failing phase's partial samples are discarded.
#[derive(Debug)]
pub struct WorkloadFailure {
    pub completed: Vec<(Phase, Vec<Duration>)>,
    pub error: HarnessError,
}

impl WorkloadFailure {
    fn new(completed: Vec<(Phase, Vec<Duration>)>, error: HarnessError) -> Self {
        Self { completed, error }
    }
}

/// Drives the fixed workload against any [`WorkloadConnection`].
pub struct WorkloadRunner<R: Rng = StdRng> {
    rng: R,
}

impl WorkloadRunner<StdRng> {
    /// Reproducible runner: the same seed picks the same prices and keys.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> WorkloadRunner<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Run every step in order. Any failure aborts the remaining steps.
    pub fn run<C: WorkloadConnection + ?Sized>(
        &mut self,
        conn: &mut C,
    ) -> std::result::Result<PhaseSamples, WorkloadFailure> {
        self.prepare(conn)
            .map_err(|err| WorkloadFailure::new(Vec::new(), err))?;

        let read1 = self
            .time_rank_reads(conn)
            .map_err(|err| WorkloadFailure::new(Vec::new(), err))?;

        let read2 = match self.time_key_reads(conn) {
            Ok(samples) => samples,
            Err(err) => return Err(WorkloadFailure::new(vec![(Phase::Read1, read1)], err)),
        };

        let write1 = match self.time_inserts(conn) {
            Ok(samples) => samples,
            Err(err) => {
                return Err(WorkloadFailure::new(
                    vec![(Phase::Read1, read1), (Phase::Read2, read2)],
                    err,
                ))
            }
        };

        Ok(PhaseSamples {
            read1,
            read2,
            write1,
        })
    }

    /// Recreate the fixture tables and seed products, then reviews.
    pub fn prepare<C: WorkloadConnection + ?Sized>(&mut self, conn: &mut C) -> Result<()> {
        conn.reset_schema()?;

        let products = fixtures::generate_products(&mut self.rng);
        conn.seed_products(&products)?;

        let reviews = fixtures::generate_reviews();
        conn.seed_reviews(&reviews)?;

        debug!(
            "{}: seeded {} products and {} reviews",
            conn.engine(),
            products.len(),
            reviews.len()
        );
        Ok(())
    }

    /// `Read1`: fetch the highest-priced product `QUERY_COUNT` times.
    pub fn time_rank_reads<C: WorkloadConnection + ?Sized>(
        &mut self,
        conn: &mut C,
    ) -> Result<Vec<Duration>> {
        let mut samples = Vec::with_capacity(QUERY_COUNT);
        for _ in 0..QUERY_COUNT {
            let start = Instant::now();
            let found = conn.most_expensive_product()?;
            let elapsed = start.elapsed();
            if found.is_none() {
                return Err(HarnessError::Query("products table is empty".to_string()));
            }
            samples.push(elapsed);
        }
        Ok(samples)
    }

    /// `Read2`: look up a randomly chosen seeded product by name.
    pub fn time_key_reads<C: WorkloadConnection + ?Sized>(
        &mut self,
        conn: &mut C,
    ) -> Result<Vec<Duration>> {
        let mut samples = Vec::with_capacity(QUERY_COUNT);
        for _ in 0..QUERY_COUNT {
            let name = fixtures::product_name(self.rng.gen_range(0..PRODUCT_COUNT));
            let start = Instant::now();
            let found = conn.product_by_name(&name)?;
            let elapsed = start.elapsed();
            match found {
                Some(product) if product.name == name => samples.push(elapsed),
                _ => return Err(HarnessError::Query(format!("no product named {name}"))),
            }
        }
        Ok(samples)
    }

    /// `Write1`: insert `QUERY_COUNT` new products one row at a time.
    pub fn time_inserts<C: WorkloadConnection + ?Sized>(
        &mut self,
        conn: &mut C,
    ) -> Result<Vec<Duration>> {
        let mut samples = Vec::with_capacity(QUERY_COUNT);
        for i in 0..QUERY_COUNT {
            let product = NewProduct {
                name: fixtures::product_name(i),
                price: fixtures::random_price(&mut self.rng),
            };
            let start = Instant::now();
            conn.insert_product(&product)?;
            samples.push(start.elapsed());
        }
        Ok(samples)
    }
}
