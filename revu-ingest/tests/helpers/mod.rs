//! Shared fixtures for revu-ingest integration tests
//!
//! In-memory catalog stores, source configurations pointed at fake
//! upstreams, and a scripted upstream server for status sequences.

#![allow(dead_code)]

use axum::{http::StatusCode, Json, Router};
use revu_common::config::SourcesToml;
use revu_ingest::config::IngestConfig;
use revu_ingest::db::{self, SqliteCatalogStore};
use revu_ingest::models::{CatalogProduct, CommittedReview};
use revu_ingest::types::CatalogStore;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory catalog holding `products` products named "Product 0".."Product n-1"
pub async fn memory_store(products: usize) -> (SqlitePool, SqliteCatalogStore) {
    let pool = db::init_memory_pool().await.unwrap();
    for i in 0..products {
        db::products::insert_product(
            &pool,
            &format!("Product {}", i),
            Some("test product"),
            Some(&format!("https://images.test/{}.jpg", i)),
        )
        .await
        .unwrap();
    }
    let store = SqliteCatalogStore::new(pool.clone());
    (pool, store)
}

/// Source config with each networked source enabled iff its URL is given
///
/// Retries keep the default count but use a 5 ms delay unit.
pub fn ingest_config(catalog_url: Option<&str>, marketplace_url: Option<&str>) -> IngestConfig {
    let toml = SourcesToml {
        catalog_source_enabled: Some(catalog_url.is_some()),
        marketplace_source_enabled: Some(marketplace_url.is_some()),
        marketplace_api_key: Some("test-key".to_string()),
        marketplace_host: Some("marketplace.test".to_string()),
        marketplace_item_id: Some("B000TEST".to_string()),
        marketplace_requests_per_second: Some(100),
        catalog_base_url: catalog_url.map(str::to_string),
        marketplace_base_url: marketplace_url.map(str::to_string),
        max_retries: Some(3),
        base_delay_ms: Some(5),
    };
    IngestConfig::resolve_with(&toml, |_| None).unwrap()
}

/// Upstream answering successive requests from a fixed script
///
/// The last response repeats once the script runs out.
pub struct ScriptedUpstream {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
}

impl ScriptedUpstream {
    pub async fn spawn(script: Vec<(u16, Value)>) -> Self {
        assert!(!script.is_empty());
        let hits = Arc::new(AtomicUsize::new(0));
        let script = Arc::new(script);

        let counter = hits.clone();
        let app = Router::new().fallback(move || {
            let counter = counter.clone();
            let script = script.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = script[n.min(script.len() - 1)].clone();
                (StatusCode::from_u16(status).unwrap(), Json(body))
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Store whose `insert_review` fails on the n-th call (0-based)
pub struct FailingInsertStore {
    inner: SqliteCatalogStore,
    fail_at: usize,
    inserts: AtomicUsize,
}

impl FailingInsertStore {
    pub fn new(inner: SqliteCatalogStore, fail_at: usize) -> Self {
        Self {
            inner,
            fail_at,
            inserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for FailingInsertStore {
    async fn list_products(&self) -> revu_common::Result<Vec<CatalogProduct>> {
        self.inner.list_products().await
    }

    async fn insert_review(
        &self,
        product_id: i64,
        reviewer_name: &str,
        rating: u8,
        comment: &str,
    ) -> revu_common::Result<i64> {
        if self.inserts.fetch_add(1, Ordering::SeqCst) == self.fail_at {
            return Err(revu_common::Error::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner
            .insert_review(product_id, reviewer_name, rating, comment)
            .await
    }

    async fn get_review_with_product(&self, id: i64) -> revu_common::Result<CommittedReview> {
        self.inner.get_review_with_product(id).await
    }
}
