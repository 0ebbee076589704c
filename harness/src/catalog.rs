//! The fixed set of comparison points and how each one is reached.

use crate::config::HarnessConfig;
use crate::driver::postgres::PostgresConnection;
use crate::driver::sqlite::SqliteConnection;
use crate::driver::WorkloadConnection;
use crate::error::{HarnessError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A named data-store target, ordered from nearest to farthest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Embedded single-file engine, no network hop.
    Sqlite,
    SameBox,
    IntraAz,
    InterAz,
    InterRegion,
}

impl Backend {
    pub const ALL: [Backend; 5] = [
        Backend::Sqlite,
        Backend::SameBox,
        Backend::IntraAz,
        Backend::InterAz,
        Backend::InterRegion,
    ];

    /// Label prefix used in the result log.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Sqlite => "SQLite",
            Backend::SameBox => "SameBox",
            Backend::IntraAz => "IntraAZ",
            Backend::InterAz => "InterAZ",
            Backend::InterRegion => "InterRegion",
        }
    }

    /// Env var holding the connection URL; `None` for the embedded store.
    pub fn url_env_var(self) -> Option<&'static str> {
        match self {
            Backend::Sqlite => None,
            Backend::SameBox => Some("SAME_BOX_POSTGRES_URL"),
            Backend::IntraAz => Some("INTRA_AZ_POSTGRES_URL"),
            Backend::InterAz => Some("INTER_AZ_POSTGRES_URL"),
            Backend::InterRegion => Some("INTER_REGION_POSTGRES_URL"),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a backend lives and which driver reaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    Embedded(PathBuf),
    Postgres(String),
}

impl ConnectionTarget {
    /// Parse a remote URL. `sqlite://<path>` points at an embedded file.
    pub fn parse(url: &str) -> Result<Self> {
        if let Some(path) = url.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(HarnessError::Configuration(
                    "sqlite:// url without a path".to_string(),
                ));
            }
            return Ok(ConnectionTarget::Embedded(PathBuf::from(path)));
        }
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(ConnectionTarget::Postgres(url.to_string()));
        }
        let scheme = url.split("://").next().unwrap_or(url);
        Err(HarnessError::Configuration(format!(
            "unsupported connection scheme `{scheme}`"
        )))
    }

    pub fn connect(&self) -> Result<Box<dyn WorkloadConnection>> {
        let conn: Box<dyn WorkloadConnection> = match self {
            ConnectionTarget::Embedded(path) => Box::new(SqliteConnection::open(path)?),
            ConnectionTarget::Postgres(url) => Box::new(PostgresConnection::connect(url)?),
        };
        Ok(conn)
    }
}

/// Resolves every [`Backend`] to a [`ConnectionTarget`].
#[derive(Debug, Clone)]
pub struct BackendCatalog {
    embedded_path: PathBuf,
    remote_urls: HashMap<Backend, String>,
}

impl BackendCatalog {
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            embedded_path: config.database_path.clone(),
            remote_urls: config.remote_urls.clone(),
        }
    }

    pub fn backends(&self) -> &'static [Backend] {
        &Backend::ALL
    }

    pub fn resolve(&self, backend: Backend) -> Result<ConnectionTarget> {
        if backend == Backend::Sqlite {
            return Ok(ConnectionTarget::Embedded(self.embedded_path.clone()));
        }

        let url = self.remote_urls.get(&backend).ok_or_else(|| {
            HarnessError::Configuration(format!(
                "{backend} is not configured (set {})",
                backend.url_env_var().unwrap_or("a connection url")
            ))
        })?;
        ConnectionTarget::parse(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_backend_uses_database_path() {
        let config = HarnessConfig {
            database_path: PathBuf::from("/tmp/latency.sqlite"),
            ..HarnessConfig::default()
        };
        let catalog = BackendCatalog::from_config(&config);
        assert_eq!(
            catalog.resolve(Backend::Sqlite).unwrap(),
            ConnectionTarget::Embedded(PathBuf::from("/tmp/latency.sqlite"))
        );
    }

    #[test]
    fn unconfigured_remote_is_a_configuration_error() {
        let catalog = BackendCatalog::from_config(&HarnessConfig::default());
        for backend in &Backend::ALL[1..] {
            let err = catalog.resolve(*backend).unwrap_err();
            assert!(matches!(err, HarnessError::Configuration(_)), "{backend}");
        }
    }

    #[test]
    fn remote_urls_pick_driver_by_scheme() {
        let config = HarnessConfig::default()
            .with_remote_url(Backend::SameBox, "postgres://u:p@localhost/db")
            .with_remote_url(Backend::IntraAz, "postgresql://u:p@10.0.0.2/db")
            .with_remote_url(Backend::InterAz, "sqlite:///tmp/inter_az.sqlite")
            .with_remote_url(Backend::InterRegion, "mysql://elsewhere/db");
        let catalog = BackendCatalog::from_config(&config);

        assert!(matches!(
            catalog.resolve(Backend::SameBox).unwrap(),
            ConnectionTarget::Postgres(_)
        ));
        assert!(matches!(
            catalog.resolve(Backend::IntraAz).unwrap(),
            ConnectionTarget::Postgres(_)
        ));
        assert_eq!(
            catalog.resolve(Backend::InterAz).unwrap(),
            ConnectionTarget::Embedded(PathBuf::from("/tmp/inter_az.sqlite"))
        );
        assert!(matches!(
            catalog.resolve(Backend::InterRegion),
            Err(HarnessError::Configuration(_))
        ));
    }

    #[test]
    fn catalog_lists_five_backends_in_distance_order() {
        let catalog = BackendCatalog::from_config(&HarnessConfig::default());
        let names: Vec<&str> = catalog.backends().iter().map(|b| b.name()).collect();
        assert_eq!(
            names,
            ["SQLite", "SameBox", "IntraAZ", "InterAZ", "InterRegion"]
        );
    }
}
