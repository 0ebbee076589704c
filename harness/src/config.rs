//! Environment-driven configuration for the harness.

use crate::catalog::Backend;
use log::warn;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "db/latency_simulations.sqlite";

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// SQLite file holding the result log; also the embedded backend's store.
    pub database_path: PathBuf,
    /// Connection URLs for the remote backends.
    pub remote_urls: HashMap<Backend, String>,
    /// Fixed generator seed for reproducible workloads.
    pub workload_seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            remote_urls: HashMap::new(),
            workload_seed: None,
        }
    }
}

/// Read an env var, treating blank values as unset.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl HarnessConfig {
    /// Build from `LATENCY_DB_PATH`, the four `*_POSTGRES_URL` variables and
    /// `LATENCY_WORKLOAD_SEED`.
    pub fn from_env() -> Self {
        let database_path = non_empty_var("LATENCY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let mut remote_urls = HashMap::new();
        for backend in Backend::ALL {
            if let Some(key) = backend.url_env_var() {
                if let Some(url) = non_empty_var(key) {
                    remote_urls.insert(backend, url);
                }
            }
        }

        let workload_seed = non_empty_var("LATENCY_WORKLOAD_SEED").and_then(|raw| {
            raw.parse::<u64>()
                .map_err(|_| warn!("Ignoring LATENCY_WORKLOAD_SEED={raw}: not a u64"))
                .ok()
        });

        Self {
            database_path,
            remote_urls,
            workload_seed,
        }
    }

    pub fn with_remote_url(mut self, backend: Backend, url: impl Into<String>) -> Self {
        self.remote_urls.insert(backend, url.into());
        self
    }
}
