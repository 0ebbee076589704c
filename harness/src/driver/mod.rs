//! Connection drivers and the common `WorkloadConnection` trait.
//!
//! Two implementations are provided:
//! - [`sqlite::SqliteConnection`]: embedded single-file engine (rusqlite)
//! - [`postgres::PostgresConnection`]: remote targets over the network

pub mod postgres;
pub mod sqlite;

use crate::error::Result;

/// One row of the `products` fixture table.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Product fixture awaiting insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
}

/// Review fixture awaiting insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub product_id: i64,
    pub review: String,
}

/// Trait implemented by each store flavour (embedded vs remote).
///
/// Each method is one database interaction of the workload. The runner owns
/// timing and fixture generation; implementations only speak their dialect.
/// Errors are reported with the variant matching the workload step
/// (`Schema`, `Seed`, `Query`, `Write`).
pub trait WorkloadConnection {
    /// Human-readable engine name for logs.
    fn engine(&self) -> &'static str;

    /// Drop `product_reviews` and `products` if present, then recreate both
    /// tables with their indexes.
    fn reset_schema(&mut self) -> Result<()>;

    /// Insert every product in one transaction; any failure rolls back all.
    fn seed_products(&mut self, products: &[NewProduct]) -> Result<()>;

    /// Insert every review in one transaction; any failure rolls back all.
    fn seed_reviews(&mut self, reviews: &[NewReview]) -> Result<()>;

    /// The single highest-priced product.
    fn most_expensive_product(&mut self) -> Result<Option<Product>>;

    /// Indexed equality lookup by product name.
    fn product_by_name(&mut self, name: &str) -> Result<Option<Product>>;

    /// Single-row insert into `products`.
    fn insert_product(&mut self, product: &NewProduct) -> Result<()>;
}
