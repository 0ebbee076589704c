//! Error taxonomy shared by every harness component.

use thiserror::Error;

/// Failures surfaced by the latency harness.
///
/// Every layer returns the first error it hits; nothing is retried and nothing
/// is partially persisted.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Missing or unusable backend connection target.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The driver could not open a connection to a resolved target.
    #[error("connection error: {0}")]
    Connection(String),
    /// DDL failed while resetting the fixture tables.
    #[error("schema error: {0}")]
    Schema(String),
    /// Fixture insertion failed; the seed transaction was rolled back.
    #[error("seed error: {0}")]
    Seed(String),
    /// A timed read failed or returned no row.
    #[error("query error: {0}")]
    Query(String),
    /// A timed insert failed.
    #[error("write error: {0}")]
    Write(String),
    /// Percentiles are undefined for an empty sample set.
    #[error("cannot compute statistics over zero samples")]
    EmptyInput,
    /// A sample was rejected by the percentile computation.
    #[error("numeric error: {0}")]
    Numeric(String),
    /// The result-log transaction failed and was rolled back.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// A simulation run aborted; wraps the first component failure.
    #[error("simulation run failed at {stage}: {source}")]
    Run {
        stage: String,
        #[source]
        source: Box<HarnessError>,
    },
}

impl HarnessError {
    pub fn run(stage: impl Into<String>, source: HarnessError) -> Self {
        HarnessError::Run {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through any `Run` wrappers.
    pub fn root(&self) -> &HarnessError {
        match self {
            HarnessError::Run { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
