//! The result log: one row of latency statistics per (backend, phase) label.

use crate::driver::sqlite::configure_connection;
use crate::error::{HarnessError, Result};
use crate::stats::LatencyStats;
use log::debug;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    DROP TABLE IF EXISTS latency_logs;
    CREATE TABLE IF NOT EXISTS latency_logs (
        label TEXT NOT NULL PRIMARY KEY,
        median_latency REAL,
        p10_latency REAL,
        p25_latency REAL,
        p75_latency REAL,
        p90_latency REAL,
        p95_latency REAL,
        count REAL
    );
    CREATE INDEX IF NOT EXISTS idx_label ON latency_logs (label);";

/// A persisted `latency_logs` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub label: String,
    #[serde(flatten)]
    pub stats: LatencyStats,
}

impl ResultRow {
    pub fn new(label: impl Into<String>, stats: LatencyStats) -> Self {
        Self {
            label: label.into(),
            stats,
        }
    }
}

/// Column a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Label,
    Median,
    P10,
    P25,
    P75,
    P90,
    P95,
    Count,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Label,
        SortColumn::Median,
        SortColumn::P10,
        SortColumn::P25,
        SortColumn::P75,
        SortColumn::P90,
        SortColumn::P95,
        SortColumn::Count,
    ];

    /// Lenient parse: column names and their short aliases (`median`, `p95`,
    /// ...) are recognised, anything else sorts by label.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "median_latency" | "median" => SortColumn::Median,
            "p10_latency" | "p10" => SortColumn::P10,
            "p25_latency" | "p25" => SortColumn::P25,
            "p75_latency" | "p75" => SortColumn::P75,
            "p90_latency" | "p90" => SortColumn::P90,
            "p95_latency" | "p95" => SortColumn::P95,
            "count" => SortColumn::Count,
            _ => SortColumn::Label,
        }
    }

    pub fn column_name(self) -> &'static str {
        match self {
            SortColumn::Label => "label",
            SortColumn::Median => "median_latency",
            SortColumn::P10 => "p10_latency",
            SortColumn::P25 => "p25_latency",
            SortColumn::P75 => "p75_latency",
            SortColumn::P90 => "p90_latency",
            SortColumn::P95 => "p95_latency",
            SortColumn::Count => "count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `desc` (any case) is descending; everything else is ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Persistent result log over a long-lived SQLite handle.
pub struct ResultStore {
    conn: Mutex<Connection>,
}

impl ResultStore {
    /// Open the result log file, creating parent directories as needed, and
    /// recreate `latency_logs` so the schema is always current.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                HarnessError::Persistence(format!("create {}: {err}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).map_err(|err| {
            HarnessError::Persistence(format!("open {}: {err}", path.display()))
        })?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|err| HarnessError::Persistence(err.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        configure_connection(&conn)
            .and_then(|_| conn.execute_batch(SCHEMA))
            .map_err(|err| HarnessError::Persistence(format!("initialise latency_logs: {err}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-call leaves the connection itself usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or replace every row in one transaction; all or nothing.
    pub fn upsert_all(&self, rows: &[ResultRow]) -> Result<()> {
        let mut conn = self.lock();
        let write = |conn: &mut Connection| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO latency_logs
                        (label, median_latency, p10_latency, p25_latency,
                         p75_latency, p90_latency, p95_latency, count)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(label) DO UPDATE SET
                        median_latency = excluded.median_latency,
                        p10_latency = excluded.p10_latency,
                        p25_latency = excluded.p25_latency,
                        p75_latency = excluded.p75_latency,
                        p90_latency = excluded.p90_latency,
                        p95_latency = excluded.p95_latency,
                        count = excluded.count",
                )?;
                for row in rows {
                    let s = &row.stats;
                    stmt.execute(params![
                        row.label,
                        s.median,
                        s.p10,
                        s.p25,
                        s.p75,
                        s.p90,
                        s.p95,
                        s.count as f64,
                    ])?;
                }
            }
            tx.commit()
        };
        write(&mut conn).map_err(|err| HarnessError::Persistence(err.to_string()))?;
        debug!("Upserted {} latency rows", rows.len());
        Ok(())
    }

    /// Every row ordered by `column`; ties fall back to label ascending.
    pub fn list_sorted(
        &self,
        column: SortColumn,
        direction: SortDirection,
    ) -> Result<Vec<ResultRow>> {
        let sql = format!(
            "SELECT label, median_latency, p10_latency, p25_latency,
                    p75_latency, p90_latency, p95_latency, count
             FROM latency_logs ORDER BY {} {}, label ASC",
            column.column_name(),
            direction.keyword()
        );

        let conn = self.lock();
        let read = || -> rusqlite::Result<Vec<ResultRow>> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok(ResultRow {
                    label: row.get(0)?,
                    stats: LatencyStats {
                        median: row.get(1)?,
                        p10: row.get(2)?,
                        p25: row.get(3)?,
                        p75: row.get(4)?,
                        p90: row.get(5)?,
                        p95: row.get(6)?,
                        count: row.get::<_, f64>(7)? as usize,
                    },
                })
            })?;
            rows.collect()
        };
        read().map_err(|err| HarnessError::Persistence(err.to_string()))
    }

    /// Lenient variant taking raw request parameters.
    pub fn list_sorted_by(&self, column: &str, direction: &str) -> Result<Vec<ResultRow>> {
        self.list_sorted(SortColumn::parse(column), SortDirection::parse(direction))
    }
}
