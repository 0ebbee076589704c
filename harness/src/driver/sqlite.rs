//! Embedded single-file engine: no network hop between harness and store.

use super::{NewProduct, NewReview, Product, WorkloadConnection};
use crate::error::{HarnessError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = "
    DROP TABLE IF EXISTS product_reviews;
    DROP TABLE IF EXISTS products;
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        price REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_products_name ON products (name);
    CREATE TABLE IF NOT EXISTS product_reviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id INTEGER NOT NULL,
        review TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_product_reviews_product_id ON product_reviews (product_id);";

/// Apply the pragmas every harness-owned SQLite handle runs with.
pub fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -2000;
         PRAGMA busy_timeout = 5000;",
    )
}

pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|err| {
            HarnessError::Connection(format!("open sqlite {}: {err}", path.display()))
        })?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|err| HarnessError::Connection(format!("open in-memory sqlite: {err}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        configure_connection(&conn)
            .map_err(|err| HarnessError::Connection(format!("configure sqlite: {err}")))?;
        Ok(Self { conn })
    }

    /// Borrow the underlying handle, e.g. for row-count checks.
    pub fn raw(&self) -> &Connection {
        &self.conn
    }
}

fn product_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
    })
}

impl WorkloadConnection for SqliteConnection {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    fn reset_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(|err| HarnessError::Schema(err.to_string()))
    }

    fn seed_products(&mut self, products: &[NewProduct]) -> Result<()> {
        // Dropping an uncommitted transaction rolls it back.
        let seed = |conn: &mut Connection| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare_cached("INSERT INTO products (name, price) VALUES (?1, ?2)")?;
                for product in products {
                    stmt.execute(params![product.name, product.price])?;
                }
            }
            tx.commit()
        };
        seed(&mut self.conn).map_err(|err| HarnessError::Seed(format!("products: {err}")))
    }

    fn seed_reviews(&mut self, reviews: &[NewReview]) -> Result<()> {
        let seed = |conn: &mut Connection| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO product_reviews (product_id, review) VALUES (?1, ?2)",
                )?;
                for review in reviews {
                    stmt.execute(params![review.product_id, review.review])?;
                }
            }
            tx.commit()
        };
        seed(&mut self.conn).map_err(|err| HarnessError::Seed(format!("product_reviews: {err}")))
    }

    fn most_expensive_product(&mut self) -> Result<Option<Product>> {
        self.conn
            .prepare_cached("SELECT id, name, price FROM products ORDER BY price DESC LIMIT 1")
            .and_then(|mut stmt| stmt.query_row([], product_from_row).optional())
            .map_err(|err| HarnessError::Query(err.to_string()))
    }

    fn product_by_name(&mut self, name: &str) -> Result<Option<Product>> {
        self.conn
            .prepare_cached("SELECT id, name, price FROM products WHERE name = ?1 LIMIT 1")
            .and_then(|mut stmt| stmt.query_row([name], product_from_row).optional())
            .map_err(|err| HarnessError::Query(err.to_string()))
    }

    fn insert_product(&mut self, product: &NewProduct) -> Result<()> {
        self.conn
            .prepare_cached("INSERT INTO products (name, price) VALUES (?1, ?2)")
            .and_then(|mut stmt| stmt.execute(params![product.name, product.price]))
            .map(|_| ())
            .map_err(|err| HarnessError::Write(err.to_string()))
    }
}
