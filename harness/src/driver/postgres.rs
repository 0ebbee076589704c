//! Remote relational targets reached over the network.
//!
//! Timed statements are prepared once per schema reset so each timed call is
//! a single round trip.

use super::{NewProduct, NewReview, Product, WorkloadConnection};
use crate::error::{HarnessError, Result};
use postgres::{Client, NoTls, Row, Statement};

const SCHEMA: &str = "
    DROP TABLE IF EXISTS product_reviews;
    DROP TABLE IF EXISTS products;
    CREATE TABLE IF NOT EXISTS products (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_products_name ON products (name);
    CREATE TABLE IF NOT EXISTS product_reviews (
        id SERIAL PRIMARY KEY,
        product_id INTEGER NOT NULL,
        review TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_product_reviews_product_id ON product_reviews (product_id);";

const SELECT_TOP: &str = "SELECT id, name, price FROM products ORDER BY price DESC LIMIT 1";
const SELECT_BY_NAME: &str = "SELECT id, name, price FROM products WHERE name = $1 LIMIT 1";
const INSERT_PRODUCT: &str = "INSERT INTO products (name, price) VALUES ($1, $2)";
const INSERT_REVIEW: &str = "INSERT INTO product_reviews (product_id, review) VALUES ($1, $2)";

struct Prepared {
    select_top: Statement,
    select_by_name: Statement,
    insert_product: Statement,
}

pub struct PostgresConnection {
    client: Client,
    prepared: Option<Prepared>,
}

impl PostgresConnection {
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::connect(url, NoTls)
            .map_err(|err| HarnessError::Connection(format!("connect postgres: {err}")))?;
        Ok(Self {
            client,
            prepared: None,
        })
    }

    fn prepared(&self) -> Result<&Prepared> {
        self.prepared.as_ref().ok_or_else(|| {
            HarnessError::Query("statements used before the schema was created".to_string())
        })
    }
}

fn product_from_row(row: &Row) -> Result<Product> {
    let id: i32 = row
        .try_get(0)
        .map_err(|err| HarnessError::Query(err.to_string()))?;
    let name: String = row
        .try_get(1)
        .map_err(|err| HarnessError::Query(err.to_string()))?;
    let price: f64 = row
        .try_get(2)
        .map_err(|err| HarnessError::Query(err.to_string()))?;
    Ok(Product {
        id: i64::from(id),
        name,
        price,
    })
}

impl WorkloadConnection for PostgresConnection {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    fn reset_schema(&mut self) -> Result<()> {
        self.prepared = None;
        self.client
            .batch_execute(SCHEMA)
            .map_err(|err| HarnessError::Schema(err.to_string()))?;

        let mut prepare = |sql: &str| {
            self.client
                .prepare(sql)
                .map_err(|err| HarnessError::Schema(format!("prepare `{sql}`: {err}")))
        };
        let prepared = Prepared {
            select_top: prepare(SELECT_TOP)?,
            select_by_name: prepare(SELECT_BY_NAME)?,
            insert_product: prepare(INSERT_PRODUCT)?,
        };
        self.prepared = Some(prepared);
        Ok(())
    }

    fn seed_products(&mut self, products: &[NewProduct]) -> Result<()> {
        let seed = |client: &mut Client| -> std::result::Result<(), postgres::Error> {
            let mut tx = client.transaction()?;
            let stmt = tx.prepare(INSERT_PRODUCT)?;
            for product in products {
                tx.execute(&stmt, &[&product.name, &product.price])?;
            }
            tx.commit()
        };
        seed(&mut self.client).map_err(|err| HarnessError::Seed(format!("products: {err}")))
    }

    fn seed_reviews(&mut self, reviews: &[NewReview]) -> Result<()> {
        let mut ids = Vec::with_capacity(reviews.len());
        for review in reviews {
            let id = i32::try_from(review.product_id).map_err(|_| {
                HarnessError::Seed(format!("product id {} out of range", review.product_id))
            })?;
            ids.push(id);
        }

        let seed = |client: &mut Client| -> std::result::Result<(), postgres::Error> {
            let mut tx = client.transaction()?;
            let stmt = tx.prepare(INSERT_REVIEW)?;
            for (id, review) in ids.iter().zip(reviews) {
                tx.execute(&stmt, &[id, &review.review])?;
            }
            tx.commit()
        };
        seed(&mut self.client)
            .map_err(|err| HarnessError::Seed(format!("product_reviews: {err}")))
    }

    fn most_expensive_product(&mut self) -> Result<Option<Product>> {
        let stmt = self.prepared()?.select_top.clone();
        let row = self
            .client
            .query_opt(&stmt, &[])
            .map_err(|err| HarnessError::Query(err.to_string()))?;
        row.as_ref().map(product_from_row).transpose()
    }

    fn product_by_name(&mut self, name: &str) -> Result<Option<Product>> {
        let stmt = self.prepared()?.select_by_name.clone();
        let row = self
            .client
            .query_opt(&stmt, &[&name])
            .map_err(|err| HarnessError::Query(err.to_string()))?;
        row.as_ref().map(product_from_row).transpose()
    }

    fn insert_product(&mut self, product: &NewProduct) -> Result<()> {
        let stmt = self
            .prepared
            .as_ref()
            .map(|p| p.insert_product.clone())
            .ok_or_else(|| HarnessError::Write("insert used before the schema was created".into()))?;
        self.client
            .execute(&stmt, &[&product.name, &product.price])
            .map(|_| ())
            .map_err(|err| HarnessError::Write(err.to_string()))
    }
}
