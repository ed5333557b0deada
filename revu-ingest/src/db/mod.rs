//! Database access for revu-ingest
//!
//! SQLite-backed catalog store: products are owned by the catalog, reviews
//! are appended by the ingestion pipeline.

pub mod products;
pub mod reviews;

use crate::models::{CatalogProduct, CommittedReview};
use crate::types::CatalogStore;
use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Demo catalog inserted by `seed_demo_products`
const DEMO_PRODUCTS: [(&str, &str, &str); 4] = [
    (
        "Wireless Earbuds",
        "Bluetooth earbuds with charging case",
        "https://images.example.com/earbuds.jpg",
    ),
    (
        "Smart Speaker",
        "Voice assistant speaker",
        "https://images.example.com/speaker.jpg",
    ),
    (
        "Mechanical Keyboard",
        "Tenkeyless keyboard with brown switches",
        "https://images.example.com/keyboard.jpg",
    ),
    (
        "USB-C Hub",
        "7-in-1 hub with HDMI and card reader",
        "https://images.example.com/hub.jpg",
    ),
];

/// Initialize database connection pool
///
/// Creates the file (and parent directory) if missing and ensures the
/// catalog tables exist.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory pool with the catalog schema applied
///
/// One connection only: every `:memory:` connection is its own database.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Create catalog tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id),
            user_id INTEGER,
            user_name TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_product_id ON reviews(product_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (products, reviews)");

    Ok(())
}

/// Insert the demo catalog when no products exist
///
/// Returns the number of products inserted.
pub async fn seed_demo_products(pool: &SqlitePool) -> Result<usize> {
    if products::count_products(pool).await? > 0 {
        return Ok(0);
    }

    for (name, description, image_url) in DEMO_PRODUCTS {
        products::insert_product(pool, name, Some(description), Some(image_url)).await?;
    }

    tracing::info!(count = DEMO_PRODUCTS.len(), "Seeded demo products");
    Ok(DEMO_PRODUCTS.len())
}

/// [`CatalogStore`] over the SQLite catalog
#[derive(Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn list_products(&self) -> revu_common::Result<Vec<CatalogProduct>> {
        products::list_products(&self.pool).await
    }

    async fn insert_review(
        &self,
        product_id: i64,
        reviewer_name: &str,
        rating: u8,
        comment: &str,
    ) -> revu_common::Result<i64> {
        reviews::insert_review(&self.pool, product_id, reviewer_name, rating, comment).await
    }

    async fn get_review_with_product(&self, id: i64) -> revu_common::Result<CommittedReview> {
        reviews::get_review_with_product(&self.pool, id).await
    }
}
