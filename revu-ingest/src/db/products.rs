//! Catalog product queries
//!
//! The ingestion pipeline only reads products; `insert_product` exists for
//! the demo seed and tests.

use crate::models::CatalogProduct;
use chrono::Utc;
use revu_common::Result;
use sqlx::SqlitePool;

/// List every product, ordered by id
///
/// Random selection happens in the caller with the run's rng, so the order
/// here must stay stable.
pub async fn list_products(pool: &SqlitePool) -> Result<Vec<CatalogProduct>> {
    let products =
        sqlx::query_as::<_, CatalogProduct>("SELECT id, name FROM products ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(products)
}

/// Insert a product, returning its id
pub async fn insert_product(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
    image_url: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO products (name, description, image_url, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(description)
    .bind(image_url)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn count_products(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
